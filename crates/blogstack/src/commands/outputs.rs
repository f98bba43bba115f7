use blogstack_cloud::{Attributes, REDACTED, StateManager};
use blogstack_config::DiscoveredFile;
use colored::Colorize;
use std::collections::BTreeMap;
use std::path::PathBuf;

pub async fn handle(
    discovered: &DiscoveredFile,
    stack: &str,
    attributes: Option<PathBuf>,
    json: bool,
) -> anyhow::Result<()> {
    let loaded = blogstack_core::load_deployment_from(discovered, stack)?;
    let state_manager = StateManager::new(&loaded.project_root);

    // エンジンが報告した属性値を状態に取り込む
    if let Some(path) = attributes {
        let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
            anyhow::anyhow!("属性ファイルを読み込めません: {}: {}", path.display(), e)
        })?;
        let reported: Attributes = serde_json::from_str(&content)?;

        let lock = state_manager.acquire_lock(stack).await?;
        let mut state = state_manager.load(stack).await?;
        state.merge_attributes(reported);
        state_manager.save(&state).await?;
        lock.release().await?;
    }

    let state = state_manager.load(stack).await?;

    // 未解決の出力は None
    let resolved: BTreeMap<&str, Option<String>> = loaded
        .deployment
        .outputs
        .iter()
        .map(|(name, output)| {
            let value = if output.is_secret() {
                Some(REDACTED.to_string())
            } else {
                output.resolve(&state.attributes).ok()
            };
            (name.as_str(), value)
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&resolved)?);
        return Ok(());
    }

    println!("{} ({})", "出力".bold(), stack.cyan());
    for (name, value) in &resolved {
        match value {
            Some(value) => println!("  {} = {}", name.cyan(), value),
            None => {
                let template = loaded
                    .deployment
                    .output(name)
                    .map(|o| o.to_string())
                    .unwrap_or_default();
                println!(
                    "  {} = {} {}",
                    name.cyan(),
                    template.dimmed(),
                    "(未解決)".yellow()
                );
            }
        }
    }
    Ok(())
}
