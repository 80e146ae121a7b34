use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Structured result of one converter run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversionReport {
    /// Every `Warning:` the converter printed, in emission order
    pub warnings: Vec<String>,
    pub project_location: Option<String>,
    pub app_name: Option<String>,
    pub app_bundle_identifier: Option<String>,
    pub app_extension_bundle_identifier: Option<String>,
    pub platform: Option<String>,
    pub language: Option<String>,
    /// Present when the generated project was corrected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<PatchReport>,
}

impl ConversionReport {
    /// Human readable summary, one field per line
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();
        lines.push("Conversion Summary:".to_string());

        let fields = [
            ("Project location", &self.project_location),
            ("App name", &self.app_name),
            ("App bundle identifier", &self.app_bundle_identifier),
            ("Extension bundle identifier", &self.app_extension_bundle_identifier),
            ("Platform", &self.platform),
            ("Language", &self.language),
        ];
        for (label, value) in fields {
            lines.push(format!(
                "  {:<28} {}",
                format!("{}:", label),
                value.as_deref().unwrap_or("-")
            ));
        }

        if self.warnings.is_empty() {
            lines.push("  No warnings".to_string());
        } else {
            lines.push(format!("  Warnings ({}):", self.warnings.len()));
            for warning in &self.warnings {
                lines.push(format!("    - {}", warning.replace('\n', "\n      ")));
            }
        }

        if let Some(patch) = &self.patch {
            lines.push(patch.summary());
        }

        lines.join("\n")
    }
}

/// One bundle identifier setting that was rewritten
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationUpdate {
    pub target: String,
    pub configuration: String,
    pub from: String,
    pub to: String,
}

/// What the project patcher changed on disk
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchReport {
    pub updated_configurations: Vec<ConfigurationUpdate>,
    pub patched_sources: Vec<PathBuf>,
    pub shared_schemes: Vec<PathBuf>,
}

impl PatchReport {
    pub fn summary(&self) -> String {
        let mut lines = vec![format!(
            "  Project corrections: {} configuration(s), {} source file(s), {} shared scheme(s)",
            self.updated_configurations.len(),
            self.patched_sources.len(),
            self.shared_schemes.len()
        )];
        for update in &self.updated_configurations {
            lines.push(format!(
                "    {} [{}]: {} -> {}",
                update.target, update.configuration, update.from, update.to
            ));
        }
        for path in &self.patched_sources {
            lines.push(format!("    rewrote {}", path.display()));
        }
        lines.join("\n")
    }
}
