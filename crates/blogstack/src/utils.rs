use blogstack_config::DiscoveredFile;
use colored::Colorize;

/// スタック名を決定する（共通ロジック）
///
/// 指定がなく、設定ファイルにスタックが1つしかない場合はそれを使う。
pub fn determine_stack_name(
    stack: Option<String>,
    discovered: &DiscoveredFile,
) -> anyhow::Result<String> {
    if let Some(s) = stack {
        return Ok(s);
    }

    let file = blogstack_core::load_stack_file(&discovered.path)?;
    let names = file.stack_names();
    match names.as_slice() {
        [only] => Ok(only.to_string()),
        _ => Err(anyhow::anyhow!(
            "スタック名を指定してください: blogstack <command> <stack> または BLOGSTACK_STACK=<stack>\n利用可能なスタック: {}",
            names.join(", ")
        )),
    }
}

/// 読み込んだ設定ファイル情報を表示
pub fn print_loaded_config_file(discovered: &DiscoveredFile) {
    println!(
        "📄 設定ファイル: {}",
        discovered.path.display().to_string().cyan()
    );
}
