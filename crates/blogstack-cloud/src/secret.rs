//! Secret string values
//!
//! A `Secret` carries a value that must never reach logs, state files or
//! exported documents in plaintext. `Debug`, `Display` and `Serialize` all
//! print the redaction marker; only [`Secret::expose`] hands out the value.

use serde::{Serialize, Serializer};
use std::fmt;

/// Marker written wherever a secret value would otherwise appear
pub const REDACTED: &str = "[secret]";

#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the plaintext value
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret({})", REDACTED)
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl Serialize for Secret {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(REDACTED)
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_is_redacted_everywhere() {
        let secret = Secret::new("Authorization=Basic abc123");

        assert_eq!(format!("{}", secret), REDACTED);
        assert!(!format!("{:?}", secret).contains("abc123"));
        assert_eq!(
            serde_json::to_string(&secret).unwrap(),
            format!("\"{}\"", REDACTED)
        );
        assert_eq!(secret.expose(), "Authorization=Basic abc123");
    }

    #[test]
    fn test_empty_secret() {
        assert!(Secret::default().is_empty());
        assert!(!Secret::from("x").is_empty());
    }
}
