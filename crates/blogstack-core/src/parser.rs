//! KDLパーサー
//!
//! テンプレート展開済みのスタック設定ファイルをパースします。
//!
//! ```kdl
//! project "personal-blog"
//!
//! stack "prod" {
//!     config {
//!         appName "blog"
//!         otlpHeaders "{{ env.OTLP_HEADERS }}" secret=#true
//!     }
//!     config "azure" {
//!         location "westeurope"
//!     }
//! }
//! ```
//!
//! 名前空間なしの `config` ブロックはプロジェクト名の名前空間に入ります。
//! キーを `azure:location` のように書くと名前空間を直接指定できます。

use crate::error::{DeployError, Result};
use crate::model::{ConfigValue, StackConfig, StackFile};
use blogstack_cloud::Secret;
use kdl::{KdlDocument, KdlNode, KdlValue};
use std::collections::BTreeMap;
use tracing::debug;

/// KDL文字列をパースしてStackFileを生成
///
/// `project` ノードがない場合は `default_project` をプロジェクト名にします。
pub fn parse_stack_file(content: &str, default_project: &str) -> Result<StackFile> {
    let doc: KdlDocument = content.parse()?;

    // project はファイル内のどこに書かれていてもよい
    let project = doc
        .nodes()
        .iter()
        .find(|node| node.name().value() == "project")
        .map(|node| {
            first_string(node).ok_or_else(|| {
                DeployError::InvalidConfig("project には名前が必要です".to_string())
            })
        })
        .transpose()?
        .unwrap_or(default_project)
        .to_string();

    let mut stacks = BTreeMap::new();
    for node in doc.nodes() {
        match node.name().value() {
            "project" => {}
            "stack" => {
                let stack = parse_stack(node, &project)?;
                if stacks.contains_key(&stack.name) {
                    return Err(DeployError::InvalidConfig(format!(
                        "スタック '{}' が重複しています",
                        stack.name
                    )));
                }
                stacks.insert(stack.name.clone(), stack);
            }
            other => {
                return Err(DeployError::InvalidConfig(format!(
                    "不明なノードがあります: {}",
                    other
                )));
            }
        }
    }

    Ok(StackFile { project, stacks })
}

/// stack ノードをパース
fn parse_stack(node: &KdlNode, project: &str) -> Result<StackConfig> {
    let name = first_string(node)
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| DeployError::InvalidConfig("stack には名前が必要です".to_string()))?;

    let mut stack = StackConfig::new(project, name);

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "config" => {
                    let namespace = first_string(child).unwrap_or(project);
                    parse_config_block(child, namespace, &mut stack)?;
                }
                other => {
                    return Err(DeployError::InvalidConfig(format!(
                        "stack '{}' に不明なノードがあります: {}",
                        name, other
                    )));
                }
            }
        }
    }

    debug!(stack = %name, values = stack.len(), "Parsed stack");
    Ok(stack)
}

/// config ブロックの中身を読み込む
fn parse_config_block(node: &KdlNode, namespace: &str, stack: &mut StackConfig) -> Result<()> {
    let Some(children) = node.children() else {
        return Ok(());
    };

    for entry in children.nodes() {
        let raw_key = entry.name().value();
        let (namespace, key) = match raw_key.split_once(':') {
            Some((ns, key)) => (ns, key),
            None => (namespace, raw_key),
        };
        if namespace.is_empty() || key.is_empty() {
            return Err(DeployError::InvalidConfig(format!(
                "無効な設定キー: {}",
                raw_key
            )));
        }

        let value = entry
            .entries()
            .iter()
            .find(|e| e.name().is_none())
            .and_then(|e| kdl_value_to_string(e.value()))
            .ok_or_else(|| {
                DeployError::InvalidConfig(format!("設定 '{}' に値がありません", raw_key))
            })?;

        let secret = entry
            .entries()
            .iter()
            .find(|e| e.name().map(|n| n.value()) == Some("secret"))
            .and_then(|e| e.value().as_bool())
            .unwrap_or(false);

        let value = if secret {
            ConfigValue::Secret(Secret::new(value))
        } else {
            ConfigValue::Plain(value)
        };
        stack.insert(namespace, key, value);
    }

    Ok(())
}

fn first_string(node: &KdlNode) -> Option<&str> {
    node.entries().first().and_then(|e| e.value().as_string())
}

/// KDL値を設定値の文字列に変換
fn kdl_value_to_string(value: &KdlValue) -> Option<String> {
    if let Some(s) = value.as_string() {
        Some(s.to_string())
    } else if let Some(i) = value.as_integer() {
        Some(i.to_string())
    } else if let Some(f) = value.as_float() {
        Some(f.to_string())
    } else {
        value.as_bool().map(|b| b.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
project "personal-blog"

stack "prod" {
    config {
        appName "blog"
        appHost "blog.example.com"
        dnsResourceGroup "dns-rg"
        otlpHeaders "Authorization=Basic abc" secret=#true
    }
    config "azure" {
        location "westeurope"
    }
}

stack "dev" {
    config {
        appName "blog"
        azure:location "northeurope"
    }
}
"#;

    #[test]
    fn test_parse_stacks_and_namespaces() {
        let file = parse_stack_file(SAMPLE, "fallback").unwrap();

        assert_eq!(file.project, "personal-blog");
        assert_eq!(file.stack_names(), vec!["dev", "prod"]);

        let prod = file.stack("prod").unwrap();
        assert_eq!(
            prod.value("personal-blog", "appHost").unwrap().expose(),
            "blog.example.com"
        );
        assert_eq!(
            prod.value("azure", "location").unwrap().expose(),
            "westeurope"
        );
        assert!(prod.value("personal-blog", "otlpHeaders").unwrap().is_secret());
        assert!(!prod.value("personal-blog", "appName").unwrap().is_secret());
    }

    #[test]
    fn test_namespaced_key() {
        let file = parse_stack_file(SAMPLE, "fallback").unwrap();
        let dev = file.stack("dev").unwrap();
        assert_eq!(
            dev.value("azure", "location").unwrap().expose(),
            "northeurope"
        );
        assert!(dev.value("personal-blog", "azure:location").is_none());
    }

    #[test]
    fn test_default_project_name() {
        let file = parse_stack_file(r#"stack "dev" { config { appName "blog" } }"#, "infra")
            .unwrap();
        assert_eq!(file.project, "infra");
        assert!(file.stack("dev").unwrap().value("infra", "appName").is_some());
    }

    #[test]
    fn test_non_string_values() {
        let file = parse_stack_file(
            r#"stack "dev" { config { replicas 2; enabled #true } }"#,
            "infra",
        )
        .unwrap();
        let dev = file.stack("dev").unwrap();
        assert_eq!(dev.value("infra", "replicas").unwrap().expose(), "2");
        assert_eq!(dev.value("infra", "enabled").unwrap().expose(), "true");
    }

    #[test]
    fn test_duplicate_stack_rejected() {
        let result = parse_stack_file(r#"stack "dev"; stack "dev""#, "infra");
        assert!(matches!(result, Err(DeployError::InvalidConfig(_))));
    }

    #[test]
    fn test_config_without_value_rejected() {
        let result = parse_stack_file(r#"stack "dev" { config { appName } }"#, "infra");
        assert!(matches!(result, Err(DeployError::InvalidConfig(_))));
    }

    #[test]
    fn test_unknown_nodes_rejected() {
        match parse_stack_file(r#"project "blog"; stacks "dev""#, "infra") {
            Err(DeployError::InvalidConfig(message)) => assert!(message.contains("stacks")),
            other => panic!("expected InvalidConfig, got {:?}", other),
        }
        assert!(matches!(
            parse_stack_file(r#"stack "dev" { settings { } }"#, "infra"),
            Err(DeployError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_unnamed_stack_rejected() {
        assert!(parse_stack_file("stack { }", "infra").is_err());
    }

    #[test]
    fn test_invalid_kdl() {
        assert!(matches!(
            parse_stack_file("stack \"dev\" {", "infra"),
            Err(DeployError::KdlParse(_))
        ));
    }
}
