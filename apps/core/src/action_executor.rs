use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchError {
    EmptyPath,
    MissingPath(PathBuf),
    LaunchFailed { message: String, code: Option<i32> },
}

impl Display for LaunchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyPath => write!(f, "empty path"),
            Self::MissingPath(path) => write!(f, "path does not exist: {}", path.display()),
            Self::LaunchFailed {
                message,
                code: Some(code),
            } => write!(f, "{message} (exit code {code})"),
            Self::LaunchFailed {
                message,
                code: None,
            } => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for LaunchError {}

/// Opens an existing file or directory in the platform file browser.
pub trait PathOpener: Send + Sync {
    fn open(&self, path: &Path) -> Result<(), LaunchError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemPathOpener;

impl PathOpener for SystemPathOpener {
    fn open(&self, path: &Path) -> Result<(), LaunchError> {
        open_in_file_browser(path)
    }
}

/// Returns the trimmed path when it names an existing file or directory.
pub fn existing_path(path: &str) -> Result<PathBuf, LaunchError> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return Err(LaunchError::EmptyPath);
    }

    let candidate = Path::new(trimmed);
    if !candidate.exists() {
        return Err(LaunchError::MissingPath(candidate.to_path_buf()));
    }

    Ok(candidate.to_path_buf())
}

#[cfg(target_os = "windows")]
pub fn open_in_file_browser(path: &Path) -> Result<(), LaunchError> {
    use std::os::windows::process::CommandExt;

    // explorer.exe reports exit code 1 even when it opened the target.
    std::process::Command::new("explorer.exe")
        .raw_arg(format!("\"{}\"", path.display()))
        .spawn()
        .map(|_| ())
        .map_err(|error| LaunchError::LaunchFailed {
            message: format!("failed to start explorer.exe: {error}"),
            code: error.raw_os_error(),
        })
}

#[cfg(not(target_os = "windows"))]
pub fn open_in_file_browser(path: &Path) -> Result<(), LaunchError> {
    let opener = if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    };

    let status = std::process::Command::new(opener)
        .arg(path)
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map_err(|error| LaunchError::LaunchFailed {
            message: format!("failed to start {opener}: {error}"),
            code: None,
        })?;

    if !status.success() {
        return Err(LaunchError::LaunchFailed {
            message: format!("{opener} could not open {}", path.display()),
            code: status.code(),
        });
    }
    Ok(())
}
