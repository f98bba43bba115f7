use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("設定ディレクトリが見つかりません")]
    ConfigDirNotFound,

    #[error(
        "スタック設定ファイルが見つかりません。以下の場所を確認してください:\n\
        - カレントディレクトリ: blogstack.local.kdl, blogstack.kdl\n\
        - ./.blogstack/ ディレクトリ\n\
        - ~/.config/blogstack/blogstack.kdl\n\
        または BLOGSTACK_CONFIG_PATH 環境変数で直接指定できます"
    )]
    StackFileNotFound,

    #[error("BLOGSTACK_CONFIG_PATH が存在しないファイルを指しています: {0}")]
    ConfigPathMissing(std::path::PathBuf),

    #[error("IO エラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
