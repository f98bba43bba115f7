mod commands;
mod utils;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "blogstack")]
#[command(about = "ブログのインフラを宣言し、デプロイ文書として書き出す", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// リソースグラフと実行順序をプレビュー
    Preview {
        /// スタック名 (dev, prod)
        stack: Option<String>,
        /// スタック名 (-s/--stack フラグ、BLOGSTACK_STACK 環境変数)
        #[arg(
            short = 's',
            long = "stack",
            env = "BLOGSTACK_STACK",
            conflicts_with = "stack",
            hide = true
        )]
        stack_flag: Option<String>,
        /// プランをJSONで出力
        #[arg(long)]
        json: bool,
    },
    /// デプロイ文書を書き出す（外部エンジン向け）
    Export {
        /// スタック名 (dev, prod)
        stack: Option<String>,
        /// スタック名 (-s/--stack フラグ、BLOGSTACK_STACK 環境変数)
        #[arg(
            short = 's',
            long = "stack",
            env = "BLOGSTACK_STACK",
            conflicts_with = "stack",
            hide = true
        )]
        stack_flag: Option<String>,
        /// 状態ディレクトリに加えて書き出すファイル
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// スタックの出力値を表示
    Outputs {
        /// スタック名 (dev, prod)
        stack: Option<String>,
        /// スタック名 (-s/--stack フラグ、BLOGSTACK_STACK 環境変数)
        #[arg(
            short = 's',
            long = "stack",
            env = "BLOGSTACK_STACK",
            conflicts_with = "stack",
            hide = true
        )]
        stack_flag: Option<String>,
        /// エンジンが報告した属性値（JSON）を状態に取り込む
        #[arg(short, long)]
        attributes: Option<PathBuf>,
        /// JSONで出力
        #[arg(long)]
        json: bool,
    },
    /// 設定を検証（スタック省略時は全スタック）
    Validate {
        /// スタック名 (dev, prod)
        stack: Option<String>,
        /// スタック名 (-s/--stack フラグ、BLOGSTACK_STACK 環境変数)
        #[arg(
            short = 's',
            long = "stack",
            env = "BLOGSTACK_STACK",
            conflicts_with = "stack",
            hide = true
        )]
        stack_flag: Option<String>,
    },
    /// バージョン情報を表示
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ログはstderrへ（stdoutはJSON出力に使う）
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    // コマンドディスパッチ
    match cli.command {
        // Versionコマンドは設定ファイル不要
        Commands::Version => {
            println!("blogstack {}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Preview {
            stack,
            stack_flag,
            json,
        } => {
            let discovered = blogstack_config::find_stack_file()?;
            let stack = utils::determine_stack_name(stack.or(stack_flag), &discovered)?;
            commands::preview::handle(&discovered, &stack, json).await?;
        }
        Commands::Export {
            stack,
            stack_flag,
            out,
        } => {
            let discovered = blogstack_config::find_stack_file()?;
            let stack = utils::determine_stack_name(stack.or(stack_flag), &discovered)?;
            commands::export::handle(&discovered, &stack, out).await?;
        }
        Commands::Outputs {
            stack,
            stack_flag,
            attributes,
            json,
        } => {
            let discovered = blogstack_config::find_stack_file()?;
            let stack = utils::determine_stack_name(stack.or(stack_flag), &discovered)?;
            commands::outputs::handle(&discovered, &stack, attributes, json).await?;
        }
        Commands::Validate { stack, stack_flag } => {
            let discovered = blogstack_config::find_stack_file()?;
            commands::validate::handle(&discovered, stack.or(stack_flag)).await?;
        }
    }

    Ok(())
}
