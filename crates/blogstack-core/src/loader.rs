//! 統合ローダー
//!
//! ファイル発見、パース、テンプレート展開、設定の読み込み、
//! デプロイの組み立てを統合

use crate::descriptor::build_deployment;
use crate::error::{DeployError, Result};
use crate::model::{StackConfig, StackFile};
use crate::parser::parse_stack_file;
use crate::settings::DeploySettings;
use crate::template::TemplateProcessor;
use blogstack_cloud::Deployment;
use blogstack_config::{DiscoveredFile, find_stack_file};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// 読み込み済みのスタック
#[derive(Debug)]
pub struct LoadedStack {
    /// 設定ファイルのパス
    pub path: PathBuf,
    /// プロジェクトルート（状態ファイルの保存先）
    pub project_root: PathBuf,
    pub config: StackConfig,
    pub settings: DeploySettings,
    pub deployment: Deployment,
}

/// 設定ファイルを探してスタックを読み込む
#[instrument]
pub fn load_deployment(stack: &str) -> Result<LoadedStack> {
    info!("Starting stack load");
    let discovered = find_stack_file()?;
    load_deployment_from(&discovered, stack)
}

/// 発見済みの設定ファイルからスタックを読み込む
///
/// 以下の処理を実行:
/// 1. KDLパース
/// 2. スタックの選択
/// 3. 選択したスタックの値のテンプレート展開（`env` と `stack` を参照可能）
/// 4. 設定の読み込みとリソースグラフの組み立て
#[instrument(skip(discovered), fields(path = %discovered.path.display()))]
pub fn load_deployment_from(discovered: &DiscoveredFile, stack: &str) -> Result<LoadedStack> {
    let file = load_stack_file(&discovered.path)?;

    let raw = file
        .stack(stack)
        .ok_or_else(|| stack_not_found(&file, stack))?;
    let config = render_stack(raw, &discovered.path)?;

    debug!("Reading deploy settings");
    let settings = DeploySettings::from_source(&config)?;

    debug!("Building deployment");
    let deployment = build_deployment(&settings)?;

    info!(
        stack,
        resources = deployment.graph.len(),
        "Stack loaded successfully"
    );

    Ok(LoadedStack {
        path: discovered.path.clone(),
        project_root: discovered.project_root.clone(),
        config,
        settings,
        deployment,
    })
}

/// スタック設定ファイルをパース（値は未展開のまま）
#[instrument(skip(path), fields(path = %path.display()))]
pub fn load_stack_file(path: &Path) -> Result<StackFile> {
    let content = std::fs::read_to_string(path).map_err(|e| DeployError::IoError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    parse_stack_file(&content, &default_project_name(path))
}

/// 1つのスタックの値だけをテンプレート展開
///
/// 他のスタックでしか使わない環境変数が未設定でも失敗しません。
fn render_stack(config: &StackConfig, path: &Path) -> Result<StackConfig> {
    let mut processor = TemplateProcessor::new();
    processor.add_env_variables();
    processor.add_variable("stack", serde_json::Value::String(config.name.clone()));

    let mut rendered = StackConfig::new(&config.project, &config.name);
    for (namespace, key, value) in config.iter() {
        let text = processor.render_value(
            value.expose(),
            path,
            &format!("{}:{}", namespace, key),
        )?;
        rendered.insert(namespace, key, value.replace(text));
    }

    debug!(stack = %config.name, values = rendered.len(), "Template expansion complete");
    Ok(rendered)
}

/// `project` ノードがない場合のプロジェクト名（ディレクトリ名）
fn default_project_name(path: &Path) -> String {
    let dir = path.parent();
    let dir = match dir.and_then(|d| d.file_name()).and_then(|n| n.to_str()) {
        // .blogstack/ 内のファイルは親ディレクトリ名を使う
        Some(".blogstack") => dir.and_then(|d| d.parent()).and_then(|d| d.file_name()),
        _ => dir.and_then(|d| d.file_name()),
    };
    dir.and_then(|n| n.to_str()).unwrap_or("unnamed").to_string()
}

fn stack_not_found(file: &StackFile, stack: &str) -> DeployError {
    let available = file.stack_names();
    if available.is_empty() {
        DeployError::StackNotFound(format!("{}（stack が1つも定義されていません）", stack))
    } else {
        DeployError::StackNotFound(format!(
            "{}（利用可能: {}）",
            stack,
            available.join(", ")
        ))
    }
}
