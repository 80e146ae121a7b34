use anyhow::{Context, Result};
use std::path::Path;
use tokio::process::Command;

/// Captured result of one converter run
#[derive(Debug, Clone)]
pub struct ConverterOutput {
    pub status_success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Runs the converter through `launcher` and waits for it to exit
pub async fn run_converter(launcher: &Path, args: &[String]) -> Result<ConverterOutput> {
    tracing::debug!(launcher = %launcher.display(), ?args, "starting converter");

    let output = Command::new(launcher)
        .args(args)
        .output()
        .await
        .with_context(|| format!("Failed to execute {}", launcher.display()))?;

    let result = ConverterOutput {
        status_success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    };

    if !result.status_success {
        tracing::warn!(status = ?output.status.code(), "converter exited with failure status");
    }
    Ok(result)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_both_streams() {
        let args = vec![
            "-c".to_string(),
            "echo 'App Name: Demo'; echo 'Warning: careful' >&2".to_string(),
        ];
        let output = run_converter(Path::new("/bin/sh"), &args).await.expect("run");
        assert!(output.status_success);
        assert_eq!(output.stdout, "App Name: Demo\n");
        assert_eq!(output.stderr, "Warning: careful\n");
    }

    #[tokio::test]
    async fn failure_status_is_reported_not_raised() {
        let args = vec!["-c".to_string(), "exit 3".to_string()];
        let output = run_converter(Path::new("/bin/sh"), &args).await.expect("run");
        assert!(!output.status_success);
    }
}
