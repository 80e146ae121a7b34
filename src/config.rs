//! Conversion request assembled from an options file and command-line flags.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::data::IdentifierPair;
use crate::error::ConvertError;

/// Environment variable naming the launcher used to run the converter
pub const LAUNCHER_ENV: &str = "SWEXT_XCRUN";
pub const DEFAULT_LAUNCHER: &str = "xcrun";

/// Everything a caller can ask of one conversion
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConvertRequest {
    /// Directory of the web extension to convert
    pub extension: Option<PathBuf>,
    pub project_location: Option<PathBuf>,
    pub rebuild_project: Option<bool>,
    pub app_name: Option<String>,
    pub bundle_identifier: Option<String>,
    /// Identifier for the extension target; the converter has no flag for
    /// it, it is only used when correcting the generated project
    pub extension_bundle_identifier: Option<String>,
    pub swift: Option<bool>,
    pub objc: Option<bool>,
    pub ios_only: Option<bool>,
    pub mac_only: Option<bool>,
    pub copy_resources: Option<bool>,
    pub force: Option<bool>,
    /// Where to keep captured converter output, if anywhere
    pub run_log_dir: Option<PathBuf>,
}

impl ConvertRequest {
    /// Loads a request from a YAML options file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read options file: {}", path.display()))?;
        let request: ConvertRequest = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse options file: {}", path.display()))?;
        Ok(request)
    }

    /// Fills every field left unset here from `fallback`
    pub fn or(self, fallback: ConvertRequest) -> Self {
        Self {
            extension: self.extension.or(fallback.extension),
            project_location: self.project_location.or(fallback.project_location),
            rebuild_project: self.rebuild_project.or(fallback.rebuild_project),
            app_name: self.app_name.or(fallback.app_name),
            bundle_identifier: self.bundle_identifier.or(fallback.bundle_identifier),
            extension_bundle_identifier: self
                .extension_bundle_identifier
                .or(fallback.extension_bundle_identifier),
            swift: self.swift.or(fallback.swift),
            objc: self.objc.or(fallback.objc),
            ios_only: self.ios_only.or(fallback.ios_only),
            mac_only: self.mac_only.or(fallback.mac_only),
            copy_resources: self.copy_resources.or(fallback.copy_resources),
            force: self.force.or(fallback.force),
            run_log_dir: self.run_log_dir.or(fallback.run_log_dir),
        }
    }

    pub fn objc(&self) -> bool {
        self.objc.unwrap_or(false)
    }

    /// Swift is the default language unless Objective-C was asked for
    pub fn swift(&self) -> bool {
        self.swift.unwrap_or(!self.objc())
    }

    /// Checks for missing and mutually exclusive options before anything runs
    pub fn validate(&self) -> Result<(), ConvertError> {
        match &self.extension {
            Some(path) if !path.as_os_str().is_empty() => {}
            _ => return Err(ConvertError::MissingParameter("extension")),
        }
        if self.swift() && self.objc() {
            return Err(ConvertError::ConflictingOptions("swift", "objc"));
        }
        if self.ios_only.unwrap_or(false) && self.mac_only.unwrap_or(false) {
            return Err(ConvertError::ConflictingOptions("ios_only", "mac_only"));
        }
        Ok(())
    }

    /// The identifiers the generated project should end up with, when the
    /// caller asked for a specific bundle identifier
    pub fn requested_identifiers(&self) -> Option<IdentifierPair> {
        let app = self.bundle_identifier.as_deref().filter(|id| !id.is_empty())?;
        Some(IdentifierPair::requested(
            app,
            self.extension_bundle_identifier.as_deref(),
        ))
    }
}

/// Launcher executable name or path, honouring `SWEXT_XCRUN`
pub fn launcher_name() -> String {
    std::env::var(LAUNCHER_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_LAUNCHER.to_string())
}

/// Resolves the launcher on this host
pub fn resolve_launcher(name: &str) -> Result<PathBuf, ConvertError> {
    which::which(name).map_err(|_| ConvertError::LauncherMissing(name.to_string()))
}
