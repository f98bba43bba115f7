use crate::utils;
use blogstack_cloud::{DocumentEngine, Engine, StateManager};
use blogstack_config::DiscoveredFile;
use colored::Colorize;
use std::path::PathBuf;

pub async fn handle(
    discovered: &DiscoveredFile,
    stack: &str,
    out: Option<PathBuf>,
) -> anyhow::Result<()> {
    println!("{}", "デプロイ文書を書き出しています...".blue());
    utils::print_loaded_config_file(discovered);

    let loaded = blogstack_core::load_deployment_from(discovered, stack)?;

    let mut engine = DocumentEngine::new(StateManager::new(&loaded.project_root));
    if let Some(path) = out {
        engine = engine.with_output_file(path);
    }

    let result = engine.submit(&loaded.deployment).await?;

    println!("{}", "✓ デプロイ文書を書き出しました".green().bold());
    if let Some(path) = &result.document_path {
        println!("  {}", path.display().to_string().cyan());
    }
    println!(
        "  リソース: {}個 ({} ms)",
        result.resources, result.duration_ms
    );
    Ok(())
}
