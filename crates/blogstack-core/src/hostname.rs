//! カスタムドメインのホスト名分解

use crate::error::{DeployError, Result};

/// ゾーン頂点（apex）のレコード名
pub const APEX_RECORD: &str = "@";

/// ドメイン所有確認用TXTレコードのプレフィックス
pub const VERIFICATION_PREFIX: &str = "asuid";

/// DNSゾーンとサブドメインに分解されたホスト名
///
/// ゾーンは末尾2ラベル、サブドメインはそれより前のラベルです。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostName {
    host: String,
    zone: String,
    subdomain: String,
}

impl HostName {
    pub fn parse(host: &str) -> Result<Self> {
        let (zone, subdomain) = split_host(host)?;
        Ok(Self {
            host: host.to_string(),
            zone,
            subdomain,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.host
    }

    pub fn zone(&self) -> &str {
        &self.zone
    }

    pub fn subdomain(&self) -> &str {
        &self.subdomain
    }

    /// ホスト名がゾーンそのもの（サブドメインなし）か
    pub fn is_apex(&self) -> bool {
        self.subdomain.is_empty()
    }

    /// CNAMEレコードの相対名
    pub fn cname_record_name(&self) -> String {
        if self.is_apex() {
            APEX_RECORD.to_string()
        } else {
            self.subdomain.clone()
        }
    }

    /// 所有確認TXTレコードの相対名
    pub fn txt_record_name(&self) -> String {
        if self.is_apex() {
            VERIFICATION_PREFIX.to_string()
        } else {
            format!("{}.{}", VERIFICATION_PREFIX, self.subdomain)
        }
    }
}

/// ホスト名を `(ゾーン, サブドメイン)` に分解
///
/// `blog.example.com` → (`example.com`, `blog`)、
/// `example.com` → (`example.com`, `""`)。
pub fn split_host(host: &str) -> Result<(String, String)> {
    let invalid = |message: &str| DeployError::InvalidHostName {
        host: host.to_string(),
        message: message.to_string(),
    };

    let labels: Vec<&str> = host.split('.').collect();
    if labels.iter().any(|label| label.is_empty()) {
        return Err(invalid("空のラベルがあります"));
    }
    if labels.len() < 2 {
        return Err(invalid("ゾーンを決めるには2つ以上のラベルが必要です"));
    }

    let split = labels.len() - 2;
    Ok((labels[split..].join("."), labels[..split].join(".")))
}
