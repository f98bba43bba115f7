pub mod error;

pub use error::*;

use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 設定ファイル名（優先順）
const STACK_FILE_CANDIDATES: [&str; 2] = ["blogstack.local.kdl", "blogstack.kdl"];

/// プロジェクト内の設定ディレクトリ名
const PROJECT_DIR: &str = ".blogstack";

/// 発見されたスタック設定ファイル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    /// 設定ファイルのパス
    pub path: PathBuf,
    /// プロジェクトルート（状態ファイルの保存先）
    pub project_root: PathBuf,
}

/// blogstackのグローバル設定ディレクトリを取得
pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("blogstack");
    Ok(config_dir)
}

/// スタック設定ファイルを探す
///
/// 以下の優先順位で設定ファイルを検索:
/// 1. 環境変数 BLOGSTACK_CONFIG_PATH (直接パス指定)
/// 2. カレントディレクトリから上に向かって: blogstack.local.kdl, blogstack.kdl
///    （各ディレクトリの ./.blogstack/ 内も同様）
/// 3. ~/.config/blogstack/blogstack.kdl (グローバル設定)
pub fn find_stack_file() -> Result<DiscoveredFile> {
    let current_dir = std::env::current_dir()?;
    find_stack_file_from(&current_dir)
}

/// 指定ディレクトリを起点にスタック設定ファイルを探す
pub fn find_stack_file_from(start_dir: &Path) -> Result<DiscoveredFile> {
    // 1. 環境変数で直接指定
    if let Ok(config_path) = std::env::var("BLOGSTACK_CONFIG_PATH") {
        let path = PathBuf::from(config_path);
        if !path.exists() {
            return Err(ConfigError::ConfigPathMissing(path));
        }
        debug!(path = %path.display(), "Using BLOGSTACK_CONFIG_PATH");
        let project_root = project_root_of(&path);
        return Ok(DiscoveredFile { path, project_root });
    }

    // 2. 上に向かって探索
    let mut current = start_dir.to_path_buf();
    loop {
        if let Some(found) = find_in_dir(&current) {
            info!(path = %found.path.display(), "Found stack file");
            return Ok(found);
        }
        if !current.pop() {
            break;
        }
    }

    // 3. グローバル設定ファイル
    if let Ok(config_dir) = get_config_dir() {
        let global_config = config_dir.join("blogstack.kdl");
        if global_config.exists() {
            info!(path = %global_config.display(), "Using global stack file");
            // 状態ファイルは起点ディレクトリに置く
            return Ok(DiscoveredFile {
                path: global_config,
                project_root: start_dir.to_path_buf(),
            });
        }
    }

    Err(ConfigError::StackFileNotFound)
}

fn find_in_dir(dir: &Path) -> Option<DiscoveredFile> {
    for filename in &STACK_FILE_CANDIDATES {
        let path = dir.join(filename);
        if path.exists() {
            return Some(DiscoveredFile {
                path,
                project_root: dir.to_path_buf(),
            });
        }
    }

    let project_dir = dir.join(PROJECT_DIR);
    if project_dir.is_dir() {
        for filename in &STACK_FILE_CANDIDATES {
            let path = project_dir.join(filename);
            if path.exists() {
                return Some(DiscoveredFile {
                    path,
                    project_root: dir.to_path_buf(),
                });
            }
        }
    }

    None
}

/// 設定ファイルの位置からプロジェクトルートを決める
fn project_root_of(path: &Path) -> PathBuf {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    if parent.file_name().and_then(|n| n.to_str()) == Some(PROJECT_DIR) {
        parent
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or(parent)
    } else {
        parent
    }
}
