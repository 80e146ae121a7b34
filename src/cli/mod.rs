use anyhow::{Context, Result};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

mod converter;
mod flags;
mod progress;

use progress::ProgressIndicator;
use swext::config::{ConvertRequest, launcher_name, resolve_launcher};
use swext::contexts::{PatchRequest, ParsedOutput, build_description_path, keys, patch};
use swext::data::{ConversionReport, IdentifierPair, PatchReport};
use swext::error::ConvertError;
use swext::run_log::RunLog;

#[derive(Clone, Copy)]
pub struct Config {
    pub verbose: bool,
    pub dry_run: bool,
    pub json: bool,
}

const STEP_RUN: &str = "Running converter";
const STEP_READ: &str = "Reading converter output";
const STEP_PATCH: &str = "Correcting generated project";

pub async fn convert(request: ConvertRequest, config: &Config) -> Result<()> {
    request.validate()?;

    let launcher = launcher_name();
    let args = flags::converter_args(&request);
    let command_line = flags::command_line(&launcher, &args);

    if config.dry_run {
        println!("[DRY RUN] Would run: {}", command_line);
        if let Some(requested) = request.requested_identifiers() {
            println!(
                "[DRY RUN] Would correct bundle identifiers to {} / {}",
                requested.app_identifier, requested.extension_identifier
            );
        }
        return Ok(());
    }

    let launcher_path = resolve_launcher(&launcher)?;
    let requested = request.requested_identifiers();
    let total_steps = if requested.is_some() { 3 } else { 2 };
    let mut progress = ProgressIndicator::new(total_steps, !config.json);

    progress.start_step(STEP_RUN);
    let output = converter::run_converter(&launcher_path, &args).await?;
    progress.complete_step(STEP_RUN, output.status_success);
    if config.verbose && !config.json {
        print!("{}", output.stdout);
        eprint!("{}", output.stderr);
    }

    let run_log = match &request.run_log_dir {
        Some(dir) => {
            let log = RunLog::create(dir)?;
            log.write_command(&command_line)?;
            log.write_output(&output.stdout, &output.stderr)?;
            if config.verbose && !config.json {
                println!("Run log: {}", log.dir().display());
            }
            Some(log)
        }
        None => None,
    };

    progress.start_step(STEP_READ);
    let mut report = match interpret_output(&output.stdout, &output.stderr, requested.as_ref()) {
        Ok(report) => report,
        Err(err) => {
            progress.complete_step(STEP_READ, false);
            if let Some(raw) = err.tool_message() {
                tracing::debug!(converter_message = raw, "converter reported an error");
            }
            return Err(err.into());
        }
    };
    progress.complete_step(STEP_READ, true);

    let mut patch_error = None;
    if let Some(requested) = &requested {
        match (&report.project_location, &report.app_name) {
            (Some(location), Some(app_name)) => {
                progress.start_step(STEP_PATCH);
                match correct_project(Path::new(location), app_name, requested) {
                    Ok(patch_report) => {
                        progress.complete_step(STEP_PATCH, true);
                        report.patch = Some(patch_report);
                    }
                    Err(err) => {
                        progress.complete_step(STEP_PATCH, false);
                        patch_error = Some(err);
                    }
                }
            }
            _ => {
                tracing::warn!("converter output did not name the project location and app name");
                progress.skip_step(STEP_PATCH, "project location or app name unknown");
            }
        }
    }

    if let Some(log) = &run_log {
        log.write_report(&report)?;
    }
    progress.finish();
    print_report(&report, config)?;

    match patch_error {
        Some(err) => Err(err.context("Failed to correct the generated project")),
        None => Ok(()),
    }
}

/// Turns the converter's output streams into a report, or into the
/// converter error it describes.
fn interpret_output(
    stdout: &str,
    stderr: &str,
    requested: Option<&IdentifierPair>,
) -> Result<ConversionReport, ConvertError> {
    if let Some(err) = ConvertError::classify_stderr(stderr) {
        return Err(err);
    }

    let warnings = if stderr.is_empty() {
        Vec::new()
    } else {
        ParsedOutput::new(stderr).values(keys::WARNING)
    };

    let out = ParsedOutput::new(stdout);
    let reported_app_identifier = out.first(keys::APP_BUNDLE_IDENTIFIER);

    Ok(ConversionReport {
        warnings,
        project_location: out.first(keys::PROJECT_LOCATION),
        app_name: out.first(keys::APP_NAME),
        app_bundle_identifier: requested
            .map(|pair| pair.app_identifier.clone())
            .or(reported_app_identifier),
        app_extension_bundle_identifier: requested.map(|pair| pair.extension_identifier.clone()),
        platform: out.first(keys::PLATFORM),
        language: out.first(keys::LANGUAGE),
        patch: None,
    })
}

fn correct_project(
    project_root: &Path,
    app_name: &str,
    requested: &IdentifierPair,
) -> Result<PatchReport> {
    let build_description = build_description_path(project_root, app_name);
    patch(&PatchRequest {
        project_root,
        build_description: &build_description,
        app_display_name: app_name,
        requested,
    })
}

fn print_report(report: &ConversionReport, config: &Config) -> Result<()> {
    if config.json {
        let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
        println!("{}", json);
    } else {
        println!("{}", report.summary());
        for warning in &report.warnings {
            eprintln!("warning: {}", warning);
        }
    }
    Ok(())
}

/// Arguments of the stand-alone project correction
pub struct FixRequest {
    pub project_location: PathBuf,
    pub app_name: String,
    pub bundle_identifier: String,
    pub extension_bundle_identifier: Option<String>,
    pub build_description: Option<PathBuf>,
}

pub async fn fix(request: FixRequest, config: &Config) -> Result<()> {
    let requested = IdentifierPair::requested(
        &request.bundle_identifier,
        request.extension_bundle_identifier.as_deref(),
    );
    let build_description = request
        .build_description
        .clone()
        .unwrap_or_else(|| build_description_path(&request.project_location, &request.app_name));

    if config.dry_run {
        println!(
            "[DRY RUN] Would correct {} to {} / {}",
            build_description.display(),
            requested.app_identifier,
            requested.extension_identifier
        );
        return Ok(());
    }

    let report = patch(&PatchRequest {
        project_root: &request.project_location,
        build_description: &build_description,
        app_display_name: &request.app_name,
        requested: &requested,
    })
    .context("Failed to correct the generated project")?;

    if config.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?
        );
    } else {
        println!("✓ Project corrected");
        println!("{}", report.summary());
    }
    Ok(())
}

/// Prints the values a saved converter capture holds for `key`, or every
/// field when no key is given
pub fn parse_output(input: &Path, key: Option<&str>, config: &Config) -> Result<()> {
    let text = if input == Path::new("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read standard input")?;
        buf
    } else {
        fs::read_to_string(input)
            .with_context(|| format!("Failed to read {}", input.display()))?
    };

    let parsed = ParsedOutput::new(&text);
    match key {
        Some(key) => {
            let values = parsed.values(key);
            if config.json {
                println!("{}", serde_json::to_string_pretty(&values)?);
            } else {
                for value in values {
                    println!("{}", value);
                }
            }
        }
        None => {
            if config.json {
                let fields: Vec<serde_json::Value> = parsed
                    .records()
                    .iter()
                    .map(|record| {
                        let key = record.key();
                        serde_json::json!({
                            "key": key,
                            "value": record.value_for(key),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&fields)?);
            } else {
                for record in parsed.records() {
                    println!("{}", record.text());
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::interpret_output;
    use swext::data::IdentifierPair;
    use swext::error::ConvertError;

    const STDOUT: &str = "\
App Name: Demo
App Bundle Identifier: com.acme.Demo
Platform: All
Language: Swift
";

    #[test]
    fn missing_extension_is_reported_before_parsing() {
        let err = interpret_output("", "Could not find extension at /x", None).expect_err("error");
        assert_eq!(err, ConvertError::ExtensionNotFound("Could not find extension at /x".into()));
        assert_eq!(err.to_string(), "extension not found at specified directory");
    }

    #[test]
    fn invalid_manifest_is_reported() {
        let err = interpret_output(STDOUT, "Unable to parse manifest.json at /x/manifest.json", None)
            .expect_err("error");
        assert!(matches!(err, ConvertError::InvalidManifest(_)));
    }

    #[test]
    fn fills_report_fields_and_defaults_extension_identifier() {
        let requested = IdentifierPair::requested("com.acme.Demo", None);
        let report = interpret_output(STDOUT, "", Some(&requested)).expect("report");
        assert_eq!(report.app_name.as_deref(), Some("Demo"));
        assert_eq!(report.app_bundle_identifier.as_deref(), Some("com.acme.Demo"));
        assert_eq!(report.platform.as_deref(), Some("All"));
        assert_eq!(report.language.as_deref(), Some("Swift"));
        assert!(report.warnings.is_empty());
        assert_eq!(report.project_location, None);
        assert_eq!(
            report.app_extension_bundle_identifier.as_deref(),
            Some("com.acme.Demo.extension")
        );
    }

    #[test]
    fn keeps_converter_identifier_when_none_requested() {
        let stdout = "App Bundle Identifier: com.yourCompany.Demo\n";
        let report = interpret_output(stdout, "", None).expect("report");
        assert_eq!(report.app_bundle_identifier.as_deref(), Some("com.yourCompany.Demo"));
        assert_eq!(report.app_extension_bundle_identifier, None);
    }

    #[test]
    fn collects_all_warnings_in_order() {
        let stderr = "Warning: first issue\n  with detail\nWarning: second issue\n";
        let report = interpret_output(STDOUT, stderr, None).expect("report");
        assert_eq!(
            report.warnings,
            vec!["first issue\n  with detail".to_string(), "second issue".to_string()]
        );
    }
}
