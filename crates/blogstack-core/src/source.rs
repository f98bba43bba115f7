//! 設定値の取得
//!
//! [`ConfigSource`] はスタックの設定ストアを表します。
//! 値は `(名前空間, キー)` で引き、必須・任意・秘密の3通りで取得します。
//! [`Config`] は1つの名前空間に固定したビューです。

use crate::error::{DeployError, Result};
use crate::model::{ConfigValue, StackConfig};
use blogstack_cloud::Secret;
use tracing::warn;

/// 環境ごとの設定ストア
pub trait ConfigSource {
    /// プロジェクト名（デフォルトの名前空間）
    fn project(&self) -> &str;

    /// スタック名
    fn stack(&self) -> &str;

    fn lookup(&self, namespace: &str, key: &str) -> Option<&ConfigValue>;

    /// 任意の値を取得
    fn get(&self, namespace: &str, key: &str) -> Option<String> {
        let value = self.lookup(namespace, key)?;
        if value.is_secret() {
            warn!(
                key = %format!("{}:{}", namespace, key),
                "Secret config value read as plaintext"
            );
        }
        Some(value.expose().to_string())
    }

    /// 必須の値を取得（未設定または空ならエラー）
    fn require(&self, namespace: &str, key: &str) -> Result<String> {
        self.get(namespace, key)
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| DeployError::MissingConfig {
                namespace: namespace.to_string(),
                key: key.to_string(),
            })
    }

    /// 値を取得し、未設定なら `default` を返す
    fn get_or(&self, namespace: &str, key: &str, default: &str) -> String {
        self.get(namespace, key)
            .unwrap_or_else(|| default.to_string())
    }

    /// 秘密値として取得
    ///
    /// `secret=#true` が付いていない値も秘密として扱われます。
    fn get_secret(&self, namespace: &str, key: &str) -> Option<Secret> {
        self.lookup(namespace, key).map(|value| match value {
            ConfigValue::Secret(secret) => secret.clone(),
            ConfigValue::Plain(plain) => Secret::new(plain.as_str()),
        })
    }
}

impl ConfigSource for StackConfig {
    fn project(&self) -> &str {
        &self.project
    }

    fn stack(&self) -> &str {
        &self.name
    }

    fn lookup(&self, namespace: &str, key: &str) -> Option<&ConfigValue> {
        self.value(namespace, key)
    }
}

/// 名前空間に固定した設定ビュー
pub struct Config<'a> {
    source: &'a dyn ConfigSource,
    namespace: String,
}

impl<'a> Config<'a> {
    /// プロジェクトの名前空間
    pub fn new(source: &'a dyn ConfigSource) -> Self {
        Self::with_namespace(source, source.project())
    }

    pub fn with_namespace(source: &'a dyn ConfigSource, namespace: &str) -> Self {
        Self {
            source,
            namespace: namespace.to_string(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.source.get(&self.namespace, key)
    }

    pub fn require(&self, key: &str) -> Result<String> {
        self.source.require(&self.namespace, key)
    }

    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.source.get_or(&self.namespace, key, default)
    }

    pub fn get_secret(&self, key: &str) -> Option<Secret> {
        self.source.get_secret(&self.namespace, key)
    }
}
