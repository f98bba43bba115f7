use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeployError {
    #[error("KDLパースエラー: {0}")]
    KdlParse(#[from] kdl::KdlError),

    #[error("ファイル読み込みエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("IO エラー: {path}\n理由: {message}")]
    IoError { path: PathBuf, message: String },

    #[error("無効な設定: {0}")]
    InvalidConfig(String),

    #[error(
        "必須の設定値がありません: {namespace}:{key}\nヒント: stack ブロックの config に {key} を追加してください"
    )]
    MissingConfig { namespace: String, key: String },

    #[error("テンプレートエラー: {file}\n理由: {message}")]
    TemplateError { file: PathBuf, message: String },

    #[error("テンプレート展開エラー: {0}")]
    TemplateRenderError(String),

    #[error("スタックが見つかりません: {0}")]
    StackNotFound(String),

    #[error("無効なホスト名: {host}\n理由: {message}")]
    InvalidHostName { host: String, message: String },

    #[error(transparent)]
    Config(#[from] blogstack_config::ConfigError),

    #[error(transparent)]
    Cloud(#[from] blogstack_cloud::CloudError),
}

pub type Result<T> = std::result::Result<T, DeployError>;
