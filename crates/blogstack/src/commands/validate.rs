use crate::utils;
use blogstack_config::DiscoveredFile;
use colored::Colorize;

pub async fn handle(discovered: &DiscoveredFile, stack: Option<String>) -> anyhow::Result<()> {
    println!("{}", "設定を検証中...".blue());
    utils::print_loaded_config_file(discovered);

    // スタック省略時は全スタックを検証
    let stacks = match stack {
        Some(stack) => vec![stack],
        None => blogstack_core::load_stack_file(&discovered.path)?
            .stack_names()
            .into_iter()
            .map(String::from)
            .collect(),
    };

    if stacks.is_empty() {
        eprintln!("{}", "✗ stack が1つも定義されていません".red().bold());
        std::process::exit(1);
    }

    let mut failed = false;
    for stack in &stacks {
        match blogstack_core::load_deployment_from(discovered, stack) {
            Ok(loaded) => {
                let settings = &loaded.settings;
                let plan = blogstack_cloud::Plan::from_graph(&loaded.deployment.graph)?;
                println!();
                println!("{} {}", "✓".green().bold(), stack.cyan().bold());
                println!("  アプリ: {}", settings.app_name);
                println!("  リージョン: {}", settings.location);
                println!("  SKU: {} ({})", settings.sku.name, settings.sku.tier);
                match &settings.domain {
                    Some(domain) => println!(
                        "  カスタムドメイン: {} (zone: {})",
                        domain.host.as_str().cyan(),
                        domain.host.zone()
                    ),
                    None => println!("  カスタムドメイン: (なし)"),
                }
                println!("  リソース: {}", plan.summary());
            }
            Err(e) => {
                failed = true;
                eprintln!();
                eprintln!("{} {}", "✗ 設定エラー:".red().bold(), stack.cyan());
                eprintln!("  {}", e);
            }
        }
    }

    if failed {
        std::process::exit(1);
    }

    println!();
    println!("{}", "✓ 設定ファイルは正常です！".green().bold());
    Ok(())
}
