//! Deferred resource outputs
//!
//! Attributes such as a web app's default hostname only exist once the
//! external engine has realised the resource. An [`Output`] is a template of
//! literal text and attribute references; every reference it carries becomes
//! a dependency edge when the output is handed to another resource.

use crate::error::{CloudError, Result};
use crate::resource::Urn;
use crate::secret::{REDACTED, Secret};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Reference to a generated attribute of a registered resource
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AttributeRef {
    pub urn: Urn,
    pub attribute: String,
}

impl fmt::Display for AttributeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.urn, self.attribute)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Attribute(AttributeRef),
}

/// A value that may depend on attributes not yet known
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Output {
    segments: Vec<Segment>,
    /// Config key the engine reads the plaintext from, set for secrets
    secret: Option<String>,
}

impl Output {
    /// A value known at declaration time
    pub fn known(value: impl Into<String>) -> Self {
        Self {
            segments: vec![Segment::Literal(value.into())],
            secret: None,
        }
    }

    /// A secret value that must stay out of documents and logs
    ///
    /// Documents carry `config_key` instead of the value, for the engine to
    /// read from its own secret store. An empty secret is an ordinary empty
    /// string.
    pub fn secret(config_key: impl Into<String>, value: &Secret) -> Self {
        if value.is_empty() {
            return Output::known("");
        }
        Self {
            segments: vec![Segment::Literal(value.expose().to_string())],
            secret: Some(config_key.into()),
        }
    }

    /// The generated `attribute` of the resource identified by `urn`
    pub fn attribute(urn: Urn, attribute: impl Into<String>) -> Self {
        Self {
            segments: vec![Segment::Attribute(AttributeRef {
                urn,
                attribute: attribute.into(),
            })],
            secret: None,
        }
    }

    /// Concatenates outputs into one template. Secret if any part is secret.
    pub fn concat(parts: impl IntoIterator<Item = Output>) -> Self {
        let mut result = Output::default();
        for part in parts {
            if result.secret.is_none() {
                result.secret = part.secret;
            }
            for segment in part.segments {
                match (result.segments.last_mut(), segment) {
                    (Some(Segment::Literal(prev)), Segment::Literal(next)) => prev.push_str(&next),
                    (_, segment) => result.segments.push(segment),
                }
            }
        }
        result
    }

    pub fn is_secret(&self) -> bool {
        self.secret.is_some()
    }

    /// Config key a secret output is read from
    pub fn secret_key(&self) -> Option<&str> {
        self.secret.as_deref()
    }

    /// True when no attribute reference is involved
    pub fn is_known(&self) -> bool {
        self.references().next().is_none()
    }

    /// Attribute references this output waits on
    pub fn references(&self) -> impl Iterator<Item = &AttributeRef> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Attribute(r) => Some(r),
            Segment::Literal(_) => None,
        })
    }

    /// Plaintext value for fully known outputs, secrets included
    pub fn known_value(&self) -> Option<String> {
        let mut value = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(s) => value.push_str(s),
                Segment::Attribute(_) => return None,
            }
        }
        Some(value)
    }

    /// Resolves every reference against attributes reported by the engine
    pub fn resolve(&self, attributes: &Attributes) -> Result<String> {
        let mut value = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(s) => value.push_str(s),
                Segment::Attribute(r) => {
                    let resolved = attributes
                        .get(r)
                        .ok_or_else(|| CloudError::UnresolvedOutput(r.to_string()))?;
                    value.push_str(resolved);
                }
            }
        }
        Ok(value)
    }

    fn template(&self) -> String {
        let mut template = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(s) => template.push_str(s),
                Segment::Attribute(r) => template.push_str(&format!("${{{}}}", r)),
            }
        }
        template
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_secret() {
            return f.write_str(REDACTED);
        }
        f.write_str(&self.template())
    }
}

impl fmt::Debug for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Output({})", self)
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum OutputRepr<'a> {
    Known(String),
    Secret {
        secret: SecretRef<'a>,
    },
    Deferred {
        template: String,
        refs: Vec<&'a AttributeRef>,
    },
}

#[derive(Serialize)]
struct SecretRef<'a> {
    config: &'a str,
}

impl Serialize for Output {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let repr = if let Some(config) = &self.secret {
            OutputRepr::Secret {
                secret: SecretRef {
                    config: config.as_str(),
                },
            }
        } else if let Some(value) = self.known_value() {
            OutputRepr::Known(value)
        } else {
            OutputRepr::Deferred {
                template: self.template(),
                refs: self.references().collect(),
            }
        };
        repr.serialize(serializer)
    }
}

impl From<&str> for Output {
    fn from(value: &str) -> Self {
        Output::known(value)
    }
}

impl From<String> for Output {
    fn from(value: String) -> Self {
        Output::known(value)
    }
}

/// Attribute values reported back by the external engine, keyed by URN
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(BTreeMap<Urn, BTreeMap<String, String>>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, urn: Urn, attribute: impl Into<String>, value: impl Into<String>) {
        self.0
            .entry(urn)
            .or_default()
            .insert(attribute.into(), value.into());
    }

    pub fn get(&self, reference: &AttributeRef) -> Option<&str> {
        self.0
            .get(&reference.urn)
            .and_then(|attrs| attrs.get(&reference.attribute))
            .map(|s| s.as_str())
    }

    /// Later values win
    pub fn merge(&mut self, other: Attributes) {
        for (urn, attrs) in other.0 {
            self.0.entry(urn).or_default().extend(attrs);
        }
    }

    pub fn len(&self) -> usize {
        self.0.values().map(|attrs| attrs.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
