mod report;

pub use report::{ConfigurationUpdate, ConversionReport, PatchReport};

use serde::{Deserialize, Serialize};

/// An app bundle identifier together with the identifier of its extension target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifierPair {
    pub app_identifier: String,
    pub extension_identifier: String,
}

impl IdentifierPair {
    /// Builds the pair a caller asks for. Without an explicit extension
    /// identifier the extension lives under `<app>.extension`.
    pub fn requested(app_identifier: &str, extension_identifier: Option<&str>) -> Self {
        let extension_identifier = match extension_identifier {
            Some(ext) if !ext.is_empty() => ext.to_string(),
            _ => format!("{}.extension", app_identifier),
        };
        Self {
            app_identifier: app_identifier.to_string(),
            extension_identifier,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_extension_identifier() {
        let pair = IdentifierPair::requested("com.acme.Demo", None);
        assert_eq!(pair.extension_identifier, "com.acme.Demo.extension");
    }

    #[test]
    fn keeps_explicit_extension_identifier() {
        let pair = IdentifierPair::requested("com.acme.Demo", Some("com.acme.Demo.web"));
        assert_eq!(pair.app_identifier, "com.acme.Demo");
        assert_eq!(pair.extension_identifier, "com.acme.Demo.web");
    }

    #[test]
    fn treats_empty_extension_identifier_as_missing() {
        let pair = IdentifierPair::requested("com.acme.Demo", Some(""));
        assert_eq!(pair.extension_identifier, "com.acme.Demo.extension");
    }
}
