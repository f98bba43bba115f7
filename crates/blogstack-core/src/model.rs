//! スタック設定のデータ構造

use blogstack_cloud::Secret;
use std::collections::BTreeMap;
use std::fmt;

/// 設定値
///
/// `secret=#true` が付いた値は [`Secret`] として保持され、
/// Debug出力やログには現れません。
#[derive(Clone, PartialEq, Eq)]
pub enum ConfigValue {
    Plain(String),
    Secret(Secret),
}

impl ConfigValue {
    pub fn is_secret(&self) -> bool {
        matches!(self, ConfigValue::Secret(_))
    }

    /// 平文の値（秘密値も含む）
    pub fn expose(&self) -> &str {
        match self {
            ConfigValue::Plain(value) => value,
            ConfigValue::Secret(secret) => secret.expose(),
        }
    }

    /// 秘密かどうかを保ったまま値を差し替える
    pub fn replace(&self, value: String) -> ConfigValue {
        match self {
            ConfigValue::Plain(_) => ConfigValue::Plain(value),
            ConfigValue::Secret(_) => ConfigValue::Secret(Secret::new(value)),
        }
    }
}

impl fmt::Debug for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Plain(value) => f.debug_tuple("Plain").field(value).finish(),
            ConfigValue::Secret(secret) => f.debug_tuple("Secret").field(secret).finish(),
        }
    }
}

/// 1つのスタック（デプロイ環境）の設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackConfig {
    /// プロジェクト名（デフォルトの名前空間）
    pub project: String,
    /// スタック名（"prod", "dev" など）
    pub name: String,
    values: BTreeMap<String, BTreeMap<String, ConfigValue>>,
}

impl StackConfig {
    pub fn new(project: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            name: name.into(),
            values: BTreeMap::new(),
        }
    }

    /// 値を設定（同じキーは後勝ち）
    pub fn insert(
        &mut self,
        namespace: impl Into<String>,
        key: impl Into<String>,
        value: ConfigValue,
    ) {
        self.values
            .entry(namespace.into())
            .or_default()
            .insert(key.into(), value);
    }

    /// テストや組み込み用のビルダー
    pub fn with_value(
        mut self,
        namespace: &str,
        key: &str,
        value: impl Into<String>,
    ) -> Self {
        self.insert(namespace, key, ConfigValue::Plain(value.into()));
        self
    }

    pub fn with_secret(mut self, namespace: &str, key: &str, value: impl Into<String>) -> Self {
        self.insert(namespace, key, ConfigValue::Secret(Secret::new(value)));
        self
    }

    pub fn value(&self, namespace: &str, key: &str) -> Option<&ConfigValue> {
        self.values.get(namespace).and_then(|keys| keys.get(key))
    }

    /// (名前空間, キー, 値) を列挙
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &ConfigValue)> {
        self.values.iter().flat_map(|(namespace, keys)| {
            keys.iter()
                .map(move |(key, value)| (namespace.as_str(), key.as_str(), value))
        })
    }

    /// `namespace:key` 形式で全ての値を列挙
    pub fn entries(&self) -> impl Iterator<Item = (String, &ConfigValue)> {
        self.values.iter().flat_map(|(namespace, keys)| {
            keys.iter()
                .map(move |(key, value)| (format!("{}:{}", namespace, key), value))
        })
    }

    pub fn len(&self) -> usize {
        self.values.values().map(|keys| keys.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// パース済みのスタック設定ファイル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFile {
    pub project: String,
    pub stacks: BTreeMap<String, StackConfig>,
}

impl StackFile {
    pub fn stack(&self, name: &str) -> Option<&StackConfig> {
        self.stacks.get(name)
    }

    pub fn stack_names(&self) -> Vec<&str> {
        self.stacks.keys().map(|s| s.as_str()).collect()
    }
}
