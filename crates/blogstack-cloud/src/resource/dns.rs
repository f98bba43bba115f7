//! DNS record sets

use super::{Resource, ResourceKind, require_non_empty};
use crate::error::{CloudError, Result};
use crate::output::Output;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct TxtRecord {
    pub value: Vec<Output>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CnameRecord {
    pub cname: Output,
}

/// Record payload of a record set
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum DnsRecord {
    Txt {
        #[serde(rename = "txtRecords")]
        txt_records: Vec<TxtRecord>,
    },
    Cname {
        #[serde(rename = "cnameRecord")]
        cname_record: CnameRecord,
    },
}

impl DnsRecord {
    pub fn txt(value: Output) -> Self {
        DnsRecord::Txt {
            txt_records: vec![TxtRecord { value: vec![value] }],
        }
    }

    pub fn cname(target: Output) -> Self {
        DnsRecord::Cname {
            cname_record: CnameRecord { cname: target },
        }
    }

    pub fn record_type(&self) -> &'static str {
        match self {
            DnsRecord::Txt { .. } => "TXT",
            DnsRecord::Cname { .. } => "CNAME",
        }
    }

    fn values(&self) -> Vec<&Output> {
        match self {
            DnsRecord::Txt { txt_records } => {
                txt_records.iter().flat_map(|r| r.value.iter()).collect()
            }
            DnsRecord::Cname { cname_record } => vec![&cname_record.cname],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsRecordSet {
    pub resource_group_name: Output,
    pub zone_name: String,
    pub record_type: &'static str,
    pub relative_record_set_name: String,
    pub ttl: u32,
    #[serde(flatten)]
    pub record: DnsRecord,
}

impl DnsRecordSet {
    pub fn new(
        resource_group_name: Output,
        zone_name: impl Into<String>,
        relative_record_set_name: impl Into<String>,
        ttl: u32,
        record: DnsRecord,
    ) -> Result<Self> {
        let zone_name = zone_name.into();
        let relative_record_set_name = relative_record_set_name.into();

        require_non_empty("DnsRecordSet", "relative record set name", &relative_record_set_name)?;
        if !zone_name.contains('.') || zone_name.split('.').any(|label| label.is_empty()) {
            return Err(CloudError::invalid(
                "DnsRecordSet",
                format!("invalid zone name: {:?}", zone_name),
            ));
        }
        if ttl == 0 {
            return Err(CloudError::invalid("DnsRecordSet", "ttl must be positive"));
        }
        if record.values().is_empty() {
            return Err(CloudError::invalid("DnsRecordSet", "record has no values"));
        }

        Ok(Self {
            resource_group_name,
            zone_name,
            record_type: record.record_type(),
            relative_record_set_name,
            ttl,
            record,
        })
    }
}

impl Resource for DnsRecordSet {
    const KIND: ResourceKind = ResourceKind::DnsRecordSet;

    fn inputs(&self) -> Vec<&Output> {
        let mut inputs = vec![&self.resource_group_name];
        inputs.extend(self.record.values());
        inputs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_txt_record_serialization() {
        let record = DnsRecordSet::new(
            "dns-rg".into(),
            "example.com",
            "asuid.blog",
            3600,
            DnsRecord::txt("token".into()),
        )
        .unwrap();

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["recordType"], "TXT");
        assert_eq!(json["relativeRecordSetName"], "asuid.blog");
        assert_eq!(json["txtRecords"][0]["value"][0], "token");
        assert!(json.get("cnameRecord").is_none());
    }

    #[test]
    fn test_cname_record_serialization() {
        let record = DnsRecordSet::new(
            "dns-rg".into(),
            "example.com",
            "blog",
            3600,
            DnsRecord::cname("blog.azurewebsites.net".into()),
        )
        .unwrap();

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["recordType"], "CNAME");
        assert_eq!(json["cnameRecord"]["cname"], "blog.azurewebsites.net");
    }

    #[test]
    fn test_invalid_record_sets() {
        let txt = || DnsRecord::txt("token".into());
        assert!(DnsRecordSet::new("rg".into(), "localhost", "x", 3600, txt()).is_err());
        assert!(DnsRecordSet::new("rg".into(), "example..com", "x", 3600, txt()).is_err());
        assert!(DnsRecordSet::new("rg".into(), "example.com", "", 3600, txt()).is_err());
        assert!(DnsRecordSet::new("rg".into(), "example.com", "x", 0, txt()).is_err());
    }
}
