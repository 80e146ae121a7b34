//! Keeps the captured output of converter runs on disk.
//!
//! Each run gets its own timestamped directory under the configured base:
//! `{base}/{%Y%m%dT%H%M%SZ}/` holding the command line, both output streams,
//! and the final report.

use anyhow::{Context, Result};
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};

use crate::data::ConversionReport;

const COMMAND_FILE: &str = "command.txt";
const STDOUT_FILE: &str = "converter_stdout.txt";
const STDERR_FILE: &str = "converter_stderr.txt";
const REPORT_FILE: &str = "report.json";

#[derive(Debug, Clone)]
pub struct RunLog {
    dir: PathBuf,
}

impl RunLog {
    /// Creates a fresh run directory below `base`
    pub fn create(base: &Path) -> Result<Self> {
        fs::create_dir_all(base).with_context(|| format!("Failed to create {}", base.display()))?;
        let ts = Utc::now().format("%Y%m%dT%H%M%SZ").to_string();

        let mut dir = base.join(&ts);
        let mut suffix = 1;
        while dir.exists() {
            suffix += 1;
            dir = base.join(format!("{}_{}", ts, suffix));
        }
        fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn write_command(&self, command_line: &str) -> Result<()> {
        self.write(COMMAND_FILE, command_line)
    }

    pub fn write_output(&self, stdout: &str, stderr: &str) -> Result<()> {
        self.write(STDOUT_FILE, stdout)?;
        self.write(STDERR_FILE, stderr)
    }

    pub fn write_report(&self, report: &ConversionReport) -> Result<()> {
        let content =
            serde_json::to_string_pretty(report).context("Failed to serialize conversion report")?;
        self.write(REPORT_FILE, &content)
    }

    fn write(&self, name: &str, content: &str) -> Result<()> {
        let path = self.dir.join(name);
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))
    }
}
