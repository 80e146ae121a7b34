//! The build description of a generated Xcode project.
//!
//! The file is read into a value tree whose strings remember where they came
//! from. Edits replace those byte ranges in the original text, so everything
//! that is not edited (comments, section markers, ordering, indentation) is
//! written back unchanged.

mod parser;

pub use parser::{Dict, PlistString, Value, parse, quote};

use anyhow::{Context, Result};
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::error::PbxprojError;

pub const PROJECT_FILE: &str = "project.pbxproj";
pub const BUNDLE_IDENTIFIER_SETTING: &str = "PRODUCT_BUNDLE_IDENTIFIER";
pub const APPLICATION_PRODUCT_TYPE: &str = "com.apple.product-type.application";

/// A build configuration of one target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfiguration {
    pub id: String,
    pub name: String,
    /// The `PRODUCT_BUNDLE_IDENTIFIER` setting, when it is a plain string
    pub bundle_identifier: Option<PlistString>,
}

/// A target of the root project with its build configurations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub id: String,
    pub name: String,
    pub isa: String,
    pub product_type: Option<String>,
    /// File name of the built product, e.g. `Demo.app`
    pub product_file_name: Option<String>,
    pub default_configuration_name: Option<String>,
    pub configurations: Vec<BuildConfiguration>,
}

impl Target {
    pub fn is_application(&self) -> bool {
        self.product_type.as_deref() == Some(APPLICATION_PRODUCT_TYPE)
    }
}

#[derive(Debug)]
pub struct Project {
    file_path: PathBuf,
    source: String,
    root: Dict,
    edits: Vec<(Range<usize>, String)>,
}

impl Project {
    /// Opens a project from its `.xcodeproj` bundle or its `project.pbxproj` file
    pub fn open(path: &Path) -> Result<Self> {
        let file_path = if path.is_dir() {
            path.join(PROJECT_FILE)
        } else {
            path.to_path_buf()
        };
        let source = fs::read_to_string(&file_path)
            .with_context(|| format!("Failed to read build description: {}", file_path.display()))?;
        let project = Self::from_source(file_path.clone(), source)
            .with_context(|| format!("Failed to parse build description: {}", file_path.display()))?;
        Ok(project)
    }

    pub fn from_source(file_path: PathBuf, source: String) -> Result<Self, PbxprojError> {
        let root = match parse(&source)? {
            Value::Dict(root) => root,
            _ => {
                return Err(PbxprojError::Structure(
                    "top-level value is not a dictionary".to_string(),
                ));
            }
        };
        let project = Self {
            file_path,
            source,
            root,
            edits: Vec::new(),
        };
        project.root_project()?;
        Ok(project)
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// The `.xcodeproj` bundle directory containing the build description
    pub fn bundle_path(&self) -> &Path {
        self.file_path.parent().unwrap_or(Path::new("."))
    }

    /// Bundle directory name, e.g. `Demo.xcodeproj`
    pub fn bundle_name(&self) -> String {
        self.bundle_path()
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "project.xcodeproj".to_string())
    }

    fn objects(&self) -> Result<&Dict, PbxprojError> {
        self.root
            .get_dict("objects")
            .ok_or_else(|| PbxprojError::Structure("missing 'objects' dictionary".to_string()))
    }

    pub fn object(&self, id: &str) -> Option<&Dict> {
        self.objects().ok()?.get_dict(id)
    }

    fn root_project(&self) -> Result<&Dict, PbxprojError> {
        let root_id = self
            .root
            .get_str("rootObject")
            .ok_or_else(|| PbxprojError::Structure("missing 'rootObject'".to_string()))?;
        self.objects()?.get_dict(root_id).ok_or_else(|| {
            PbxprojError::Structure(format!("rootObject {} is not defined", root_id))
        })
    }

    /// Every target of the root project, in project order
    pub fn targets(&self) -> Result<Vec<Target>, PbxprojError> {
        let project = self.root_project()?;
        let ids = project
            .get("targets")
            .and_then(Value::as_array)
            .unwrap_or_default();

        let mut targets = Vec::new();
        for id in ids.iter().filter_map(Value::as_str) {
            let Some(object) = self.object(id) else {
                tracing::warn!(target_id = id, "target referenced by project is not defined");
                continue;
            };
            targets.push(self.read_target(id, object));
        }
        Ok(targets)
    }

    fn read_target(&self, id: &str, object: &Dict) -> Target {
        let product_file_name = object
            .get_str("productReference")
            .and_then(|file_id| self.object(file_id))
            .and_then(|file| file.get_str("path"))
            .map(str::to_string);

        let list = object
            .get_str("buildConfigurationList")
            .and_then(|list_id| self.object(list_id));

        let configurations = list
            .and_then(|l| l.get("buildConfigurations"))
            .and_then(Value::as_array)
            .unwrap_or_default()
            .iter()
            .filter_map(Value::as_str)
            .filter_map(|config_id| {
                let config = self.object(config_id)?;
                Some(BuildConfiguration {
                    id: config_id.to_string(),
                    name: config.get_str("name").unwrap_or_default().to_string(),
                    bundle_identifier: config
                        .get_dict("buildSettings")
                        .and_then(|settings| settings.get(BUNDLE_IDENTIFIER_SETTING))
                        .and_then(Value::as_plist_string)
                        .cloned(),
                })
            })
            .collect();

        Target {
            id: id.to_string(),
            name: object.get_str("name").unwrap_or(id).to_string(),
            isa: object.get_str("isa").unwrap_or_default().to_string(),
            product_type: object.get_str("productType").map(str::to_string),
            product_file_name,
            default_configuration_name: list
                .and_then(|l| l.get_str("defaultConfigurationName"))
                .map(str::to_string),
            configurations,
        }
    }

    /// Queues replacing the string at `span` with `value`
    pub fn set_string(&mut self, span: Range<usize>, value: &str) {
        self.edits.retain(|(existing, _)| *existing != span);
        self.edits.push((span, quote(value)));
    }

    pub fn has_edits(&self) -> bool {
        !self.edits.is_empty()
    }

    /// The source text with all queued edits applied
    pub fn render(&self) -> String {
        let mut edits: Vec<&(Range<usize>, String)> = self.edits.iter().collect();
        edits.sort_by_key(|(span, _)| std::cmp::Reverse(span.start));

        let mut out = self.source.clone();
        for (span, replacement) in edits {
            out.replace_range(span.clone(), replacement);
        }
        out
    }

    /// Writes the build description back to where it was read from
    pub fn save(&self) -> Result<()> {
        fs::write(&self.file_path, self.render()).with_context(|| {
            format!("Failed to write build description: {}", self.file_path.display())
        })
    }
}
