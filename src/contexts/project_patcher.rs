//! Corrects the bundle identifiers of a project generated by the converter.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::identifier_reconciler::reconcile;
use crate::data::{ConfigurationUpdate, IdentifierPair, PatchReport};
use crate::pbxproj::Project;
use crate::schemes;

/// Directory of the generated project holding the shared app sources
pub const SHARED_APP_DIR: &str = "Shared (App)";

/// View controllers that embed the extension identifier. Only the one
/// matching the chosen language exists in a given project.
pub const GENERATED_SOURCES: [&str; 2] = ["ViewController.swift", "ViewController.m"];

/// Where a generated project lives and what it should have been called
#[derive(Debug, Clone)]
pub struct PatchRequest<'a> {
    pub project_root: &'a Path,
    pub build_description: &'a Path,
    pub app_display_name: &'a str,
    pub requested: &'a IdentifierPair,
}

/// Rewrites every place the converter wrote its own identifiers instead of
/// the requested ones.
///
/// The build description is parsed before anything is written; a project
/// that cannot be read leaves the tree untouched.
pub fn patch(request: &PatchRequest<'_>) -> Result<PatchReport> {
    let mut project = Project::open(request.build_description)?;

    let shared_schemes = schemes::share_schemes(&project).context("Failed to share schemes")?;

    let wrong = reconcile(&request.requested.app_identifier, request.app_display_name);
    tracing::debug!(
        wrong_app = %wrong.app_identifier,
        wrong_extension = %wrong.extension_identifier,
        "reconciled converter identifiers"
    );

    let updated_configurations = rewrite_configurations(&mut project, &wrong, request.requested)?;
    project.save()?;

    let mut patched_sources = Vec::new();
    for file_name in GENERATED_SOURCES {
        let path = request.project_root.join(SHARED_APP_DIR).join(file_name);
        if rewrite_source(
            &path,
            &wrong.extension_identifier,
            &request.requested.extension_identifier,
        )? {
            patched_sources.push(path);
        }
    }

    Ok(PatchReport {
        updated_configurations,
        patched_sources,
        shared_schemes,
    })
}

/// Exact-match replacement of bundle identifier settings across all targets
fn rewrite_configurations(
    project: &mut Project,
    wrong: &IdentifierPair,
    requested: &IdentifierPair,
) -> Result<Vec<ConfigurationUpdate>> {
    let targets = project
        .targets()
        .with_context(|| format!("Failed to read targets of {}", project.file_path().display()))?;

    let mut updates = Vec::new();
    for target in targets {
        for configuration in target.configurations {
            let Some(current) = configuration.bundle_identifier else {
                continue;
            };
            let replacement = if current.value == wrong.app_identifier {
                &requested.app_identifier
            } else if current.value == wrong.extension_identifier {
                &requested.extension_identifier
            } else {
                continue;
            };
            if current.value == *replacement {
                continue;
            }

            tracing::info!(
                target_name = %target.name,
                configuration = %configuration.name,
                from = %current.value,
                to = %replacement,
                "rewriting bundle identifier"
            );
            project.set_string(current.span.clone(), replacement);
            updates.push(ConfigurationUpdate {
                target: target.name.clone(),
                configuration: configuration.name,
                from: current.value,
                to: replacement.clone(),
            });
        }
    }
    Ok(updates)
}

/// Replaces every occurrence of `wrong` in the file at `path` and makes sure
/// the file ends with a newline. A missing file is skipped. Returns whether
/// any occurrence was replaced.
fn rewrite_source(path: &Path, wrong: &str, requested: &str) -> Result<bool> {
    if !path.is_file() {
        return Ok(false);
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read generated source: {}", path.display()))?;
    let occurrences = content.matches(wrong).count();
    if occurrences == 0 && content.ends_with('\n') {
        return Ok(false);
    }
    let mut replaced = content.replace(wrong, requested);
    if !replaced.ends_with('\n') {
        replaced.push('\n');
    }
    fs::write(path, replaced)
        .with_context(|| format!("Failed to write generated source: {}", path.display()))?;

    tracing::info!(file = %path.display(), occurrences, "rewrote extension identifier in generated source");
    Ok(occurrences > 0)
}

/// Location of the build description inside a generated project
pub fn build_description_path(project_root: &Path, app_name: &str) -> PathBuf {
    project_root.join(format!("{}.xcodeproj", app_name))
}
