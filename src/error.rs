use std::fmt;

const EXTENSION_NOT_FOUND_PREFIX: &str = "Could not find extension at";
const INVALID_MANIFEST_PREFIX: &str = "Unable to parse manifest.json at";

/// Errors that stop a conversion before or right after the converter runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
    MissingParameter(&'static str),
    ConflictingOptions(&'static str, &'static str),
    LauncherMissing(String),
    ExtensionNotFound(String),
    InvalidManifest(String),
}

impl ConvertError {
    /// Recognises the converter's own failure messages on standard error.
    ///
    /// Only the known message prefixes are translated; any other text is left
    /// to the output parser.
    pub fn classify_stderr(stderr: &str) -> Option<Self> {
        for line in stderr.lines() {
            if line.starts_with(EXTENSION_NOT_FOUND_PREFIX) {
                return Some(ConvertError::ExtensionNotFound(line.to_string()));
            }
            if line.starts_with(INVALID_MANIFEST_PREFIX) {
                return Some(ConvertError::InvalidManifest(line.to_string()));
            }
        }
        None
    }

    /// The raw converter text behind a domain error, if any
    pub fn tool_message(&self) -> Option<&str> {
        match self {
            ConvertError::ExtensionNotFound(raw) | ConvertError::InvalidManifest(raw) => {
                Some(raw.as_str())
            }
            _ => None,
        }
    }
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConvertError::MissingParameter(name) => write!(f, "no {} param specified", name),
            ConvertError::ConflictingOptions(a, b) => {
                write!(f, "can't specify both {} and {}", a, b)
            }
            ConvertError::LauncherMissing(name) => write!(f, "{} command does not exist", name),
            ConvertError::ExtensionNotFound(_) => {
                write!(f, "extension not found at specified directory")
            }
            ConvertError::InvalidManifest(_) => {
                write!(f, "manifest.json of the extension could not be parsed")
            }
        }
    }
}

impl std::error::Error for ConvertError {}

/// Errors raised while reading a `project.pbxproj` file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PbxprojError {
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },
    Structure(String),
}

impl fmt::Display for PbxprojError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PbxprojError::Syntax {
                line,
                column,
                message,
            } => write!(f, "syntax error at {}:{}: {}", line, column, message),
            PbxprojError::Structure(details) => {
                write!(f, "unexpected project structure: {}", details)
            }
        }
    }
}

impl std::error::Error for PbxprojError {}
