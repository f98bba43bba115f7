//! テンプレート展開機能
//!
//! Teraを使用してスタック設定の値を展開します。
//! 展開はパース後、選択したスタックの値に対してだけ行われます。
//! 秘密値をファイルに書かずに環境変数から渡すための仕組みです。

use crate::error::{DeployError, Result};
use std::path::Path;
use tera::{Context, Tera};
use tracing::{debug, info};

/// テンプレートから参照できる環境変数のプレフィックス
///
/// - BLOGSTACK_*: blogstack専用の環境変数
/// - OTLP_*: テレメトリ送信先の設定
/// - CI_*: CI/CD環境の変数
pub const ALLOWED_ENV_PREFIXES: &[&str] = &["BLOGSTACK_", "OTLP_", "CI_"];

/// テンプレートプロセッサ
pub struct TemplateProcessor {
    tera: Tera,
    context: Context,
}

impl TemplateProcessor {
    /// 新しいテンプレートプロセッサを作成
    pub fn new() -> Self {
        Self {
            tera: Tera::default(),
            context: Context::new(),
        }
    }

    /// 変数を追加
    pub fn add_variable(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.context.insert(key.into(), &value);
    }

    /// 環境変数を `env` として追加（安全なもののみ）
    ///
    /// 許可されたプレフィックスを持つ変数だけが `{{ env.NAME }}` で参照できます。
    #[tracing::instrument(skip(self))]
    pub fn add_env_variables(&mut self) {
        let env: serde_json::Map<String, serde_json::Value> = std::env::vars()
            .filter(|(key, _)| {
                ALLOWED_ENV_PREFIXES
                    .iter()
                    .any(|prefix| key.starts_with(prefix))
            })
            .map(|(key, value)| {
                debug!(key = %key, "Adding environment variable");
                (key, serde_json::Value::String(value))
            })
            .collect();

        info!(
            env_var_count = env.len(),
            "Added filtered environment variables"
        );
        self.context.insert("env", &env);
    }

    /// 文字列をテンプレートとして展開
    pub fn render_str(&mut self, template: &str) -> Result<String> {
        self.tera
            .render_str(template, &self.context)
            .map_err(|e| DeployError::TemplateRenderError(extract_tera_error_detail(&e)))
    }

    /// 設定ファイル内の値を展開
    ///
    /// エラーにはファイルパスと `namespace:key` が付きます。
    pub fn render_value(&mut self, template: &str, path: &Path, key: &str) -> Result<String> {
        if !template.contains("{{") && !template.contains("{%") {
            return Ok(template.to_string());
        }
        self.render_str(template).map_err(|e| match e {
            DeployError::TemplateRenderError(message) => DeployError::TemplateError {
                file: path.to_path_buf(),
                message: format!("{}: {}", key, message),
            },
            other => other,
        })
    }
}

impl Default for TemplateProcessor {
    fn default() -> Self {
        Self::new()
    }
}

/// Teraエラーから詳細情報を抽出
///
/// 未定義変数の場合は変数名とヒントを返します。
fn extract_tera_error_detail(e: &tera::Error) -> String {
    use std::error::Error;

    let mut details = vec![e.to_string()];
    let mut source = e.source();
    while let Some(err) = source {
        details.push(err.to_string());
        source = err.source();
    }
    let full_error = details.join(" | ");

    // "Variable `xxx` not found in context"
    if full_error.contains("not found in context")
        && let Some(start) = full_error.find("Variable `")
        && let Some(end) = full_error[start..].find("` not found")
    {
        let var_name = &full_error[start + 10..start + end];
        return format!(
            "未定義の変数: `{}`\nヒント: 環境変数は {} のいずれかで始まる必要があります",
            var_name,
            ALLOWED_ENV_PREFIXES.join(", ")
        );
    }

    full_error
}
