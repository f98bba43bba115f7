use crate::utils;
use blogstack_cloud::{ActionType, DocumentEngine, Engine, StateManager};
use blogstack_config::DiscoveredFile;
use colored::Colorize;

pub async fn handle(discovered: &DiscoveredFile, stack: &str, json: bool) -> anyhow::Result<()> {
    let loaded = blogstack_core::load_deployment_from(discovered, stack)?;
    let engine = DocumentEngine::new(StateManager::new(&loaded.project_root));
    let plan = engine.preview(&loaded.deployment).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    println!("{}", "プレビュー".blue().bold());
    utils::print_loaded_config_file(discovered);
    println!(
        "プロジェクト: {}  スタック: {}",
        loaded.deployment.project.cyan(),
        stack.cyan()
    );
    println!();

    for action in &plan.actions {
        let marker = match action.action_type {
            ActionType::Declare => "+".green(),
            ActionType::Lookup => "?".yellow(),
        };
        println!(
            "  {} {:<8} {} ({})",
            marker,
            action.action_type.to_string(),
            action
                .urn
                .as_str()
                .rsplit("::")
                .next()
                .unwrap_or_default()
                .cyan(),
            action.resource_type.dimmed()
        );
        for dependency in &action.depends_on {
            println!("        ← {}", dependency.as_str().dimmed());
        }
    }

    println!();
    println!("{}", "出力:".bold());
    for (name, output) in &loaded.deployment.outputs {
        println!("  {} = {}", name.cyan(), output);
    }

    println!();
    println!("{}", plan.summary().to_string().bold());
    Ok(())
}
