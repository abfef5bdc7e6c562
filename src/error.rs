use std::fmt;
use std::time::Duration;

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Browser / CDP errors
    Browser(BrowserError),
    /// Session lifecycle errors
    Session(SessionError),
    /// The portal page did not look the way a workflow step expected
    Portal(PortalError),
    /// File errors
    File(FileError),
    /// Configuration errors
    Config(ConfigError),
    /// Anything else (wrapped third-party errors, panics)
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Portal errors end up verbatim in a record's error message, so no prefix.
        match self {
            AppError::Browser(e) => write!(f, "Browser error: {}", e),
            AppError::Session(e) => write!(f, "Session error: {}", e),
            AppError::Portal(e) => write!(f, "{}", e),
            AppError::File(e) => write!(f, "File error: {}", e),
            AppError::Config(e) => write!(f, "Configuration error: {}", e),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Browser(e) => Some(e),
            AppError::Session(e) => Some(e),
            AppError::Portal(e) => Some(e),
            AppError::File(e) => Some(e),
            AppError::Config(e) => Some(e),
            AppError::Other(_) => None,
        }
    }
}

/// Browser errors
#[derive(Debug)]
pub enum BrowserError {
    /// Launching a new browser failed
    LaunchFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// Attaching to a running browser failed
    ConnectionFailed {
        port: u16,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// Creating a page failed
    PageCreationFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// Navigation failed
    NavigationFailed {
        url: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// Script evaluation failed
    ScriptExecutionFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// Building the browser configuration failed
    ConfigurationFailed { message: String },
}

impl fmt::Display for BrowserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrowserError::LaunchFailed { source } => {
                write!(f, "failed to launch browser: {}", source)
            }
            BrowserError::ConnectionFailed { port, source } => {
                write!(f, "failed to attach to browser (port: {}): {}", port, source)
            }
            BrowserError::PageCreationFailed { source } => {
                write!(f, "failed to create page: {}", source)
            }
            BrowserError::NavigationFailed { url, source } => {
                write!(f, "failed to navigate to {}: {}", url, source)
            }
            BrowserError::ScriptExecutionFailed { source } => {
                write!(f, "script execution failed: {}", source)
            }
            BrowserError::ConfigurationFailed { message } => {
                write!(f, "invalid browser configuration: {}", message)
            }
        }
    }
}

impl std::error::Error for BrowserError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BrowserError::LaunchFailed { source }
            | BrowserError::ConnectionFailed { source, .. }
            | BrowserError::PageCreationFailed { source }
            | BrowserError::NavigationFailed { source, .. }
            | BrowserError::ScriptExecutionFailed { source } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            BrowserError::ConfigurationFailed { .. } => None,
        }
    }
}

/// Session lifecycle errors
#[derive(Debug)]
pub enum SessionError {
    /// The engine was used before `initialize`
    NotInitialized,
    /// `initialize` was called on a live session
    AlreadyInitialized,
    /// The human did not finish SSO/MFA in time
    LoginTimedOut { waited: Duration },
    /// The profile directory could not be prepared
    ProfileDirectory {
        path: String,
        source: std::io::Error,
    },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::NotInitialized => write!(f, "service not initialised"),
            SessionError::AlreadyInitialized => write!(f, "session already initialised"),
            SessionError::LoginTimedOut { waited } => {
                write!(f, "login not completed within {}s", waited.as_secs())
            }
            SessionError::ProfileDirectory { path, source } => {
                write!(f, "cannot prepare profile directory {}: {}", path, source)
            }
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::ProfileDirectory { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Per-record portal errors
#[derive(Debug, Clone, PartialEq)]
pub enum PortalError {
    /// An element never became visible
    ElementNotVisible { locator: String },
    /// None of the search input strategies resolved
    SearchInputNotFound,
    /// The results table did not render in time
    ResultsTableMissing { waited: Duration },
    /// The record has no programme code to disambiguate with
    EmptyProgramme { student_id: String },
    /// No results row contained both the student number and the programme token
    NoMatchingRow {
        student_id: String,
        token: String,
        scanned: Vec<String>,
    },
    /// The form has fewer controls than the workflow requires
    FormShape {
        control: &'static str,
        expected: usize,
        found: usize,
    },
    /// No dropdown option satisfies the reason heuristics
    NoReasonOption { options: Vec<String> },
    /// Index outside the current element list
    IndexOutOfRange {
        locator: String,
        index: usize,
        len: usize,
    },
    /// Waiting for the page to settle timed out
    Timeout { what: String, waited: Duration },
}

impl fmt::Display for PortalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortalError::ElementNotVisible { locator } => {
                write!(f, "Element not visible: {}", locator)
            }
            PortalError::SearchInputNotFound => write!(f, "Could not find search input field."),
            PortalError::ResultsTableMissing { waited } => write!(
                f,
                "Search results table did not appear within {}ms.",
                waited.as_millis()
            ),
            PortalError::EmptyProgramme { student_id } => {
                write!(f, "Programme column is empty for student {}.", student_id)
            }
            PortalError::NoMatchingRow {
                student_id,
                token,
                scanned,
            } => {
                write!(
                    f,
                    "Could not find link in row with StudentNo='{}' AND ProgCode='{}'",
                    student_id, token
                )?;
                if scanned.is_empty() {
                    write!(f, " (no result rows)")
                } else {
                    write!(f, " (scanned {} rows: {})", scanned.len(), scanned.join("; "))
                }
            }
            PortalError::FormShape {
                control,
                expected,
                found,
            } => write!(
                f,
                "Expected at least {} {} controls but found {}",
                expected, control, found
            ),
            PortalError::NoReasonOption { options } => write!(
                f,
                "No reason option matched 'Not competitive'. Options ({}): [{}]",
                options.len(),
                options
                    .iter()
                    .map(|o| format!("'{}'", o))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            PortalError::IndexOutOfRange { locator, index, len } => write!(
                f,
                "Index {} out of range for {} ({} elements)",
                index, locator, len
            ),
            PortalError::Timeout { what, waited } => {
                write!(f, "Timed out after {}ms waiting for {}", waited.as_millis(), what)
            }
        }
    }
}

impl std::error::Error for PortalError {}

/// File errors
#[derive(Debug)]
pub enum FileError {
    /// Reading failed
    ReadFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// Writing failed
    WriteFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// CSV parsing failed
    CsvParseFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// TOML parsing failed
    TomlParseFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// A required spreadsheet column is missing
    MissingColumn { column: &'static str },
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileError::ReadFailed { path, source } => {
                write!(f, "failed to read {}: {}", path, source)
            }
            FileError::WriteFailed { path, source } => {
                write!(f, "failed to write {}: {}", path, source)
            }
            FileError::CsvParseFailed { source } => write!(f, "CSV parse failed: {}", source),
            FileError::TomlParseFailed { path, source } => {
                write!(f, "TOML parse failed ({}): {}", path, source)
            }
            FileError::MissingColumn { column } => {
                write!(f, "Could not find {} column.", column)
            }
        }
    }
}

impl std::error::Error for FileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FileError::ReadFailed { source, .. }
            | FileError::WriteFailed { source, .. }
            | FileError::CsvParseFailed { source }
            | FileError::TomlParseFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

pub use crate::config::ConfigError;

// ========== Conversions ==========

impl From<chromiumoxide::error::CdpError> for AppError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        AppError::Browser(BrowserError::ScriptExecutionFailed {
            source: Box::new(err),
        })
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Browser(BrowserError::ScriptExecutionFailed {
            source: Box::new(err),
        })
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::File(FileError::TomlParseFailed {
            path: String::new(),
            source: Box::new(err),
        })
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::File(FileError::CsvParseFailed {
            source: Box::new(err),
        })
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: String::new(),
            source: Box::new(err),
        })
    }
}

impl From<PortalError> for AppError {
    fn from(err: PortalError) -> Self {
        AppError::Portal(err)
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        AppError::Session(err)
    }
}

impl From<FileError> for AppError {
    fn from(err: FileError) -> Self {
        AppError::File(err)
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Config(err)
    }
}

// ========== Constructors ==========

impl AppError {
    /// Browser launch failure
    pub fn browser_launch_failed(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        AppError::Browser(BrowserError::LaunchFailed {
            source: Box::new(source),
        })
    }

    /// Browser attach failure
    pub fn browser_connection_failed(
        port: u16,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Browser(BrowserError::ConnectionFailed {
            port,
            source: Box::new(source),
        })
    }

    /// Navigation failure
    pub fn navigation_failed(
        url: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Browser(BrowserError::NavigationFailed {
            url: url.into(),
            source: Box::new(source),
        })
    }

    /// File write failure
    pub fn file_write_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }
}

// ========== Result alias ==========

/// Application result type
pub type AppResult<T> = Result<T, AppError>;
