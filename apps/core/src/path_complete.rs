use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf, MAIN_SEPARATOR};
use std::time::{Duration, Instant};

use walkdir::WalkDir;

use crate::autocomplete::starts_with_ignore_case;

/// Limits for one filesystem completion pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathSearchBounds {
    pub max_depth: usize,
    pub budget: Duration,
}

impl Default for PathSearchBounds {
    fn default() -> Self {
        Self {
            max_depth: 32,
            budget: Duration::from_millis(2_000),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoCompleteError {
    BudgetExceeded { root: PathBuf, elapsed: Duration },
}

impl Display for AutoCompleteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BudgetExceeded { root, elapsed } => write!(
                f,
                "path search under {} stopped after {} ms",
                root.display(),
                elapsed.as_millis()
            ),
        }
    }
}

impl std::error::Error for AutoCompleteError {}

/// Local filesystem roots: drive letters on Windows, `/` elsewhere.
pub fn local_roots() -> Vec<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        use windows_sys::Win32::Storage::FileSystem::GetLogicalDrives;

        let mask = unsafe { GetLogicalDrives() };
        (0..26u8)
            .filter(|bit| mask & (1 << bit) != 0)
            .map(|bit| PathBuf::from(format!("{}:\\", (b'A' + bit) as char)))
            .collect()
    }

    #[cfg(not(target_os = "windows"))]
    {
        vec![PathBuf::from("/")]
    }
}

pub fn complete_path(
    roots: &[PathBuf],
    input_text: &str,
    bounds: PathSearchBounds,
) -> Result<Option<String>, AutoCompleteError> {
    let started = Instant::now();
    for root in roots {
        if let Some(hit) = complete_under_root(root, input_text, bounds, started)? {
            return Ok(Some(hit));
        }
    }
    Ok(None)
}

/// Depth-first walk of `root`, files before subdirectories at every level.
/// Only directories whose path prefixes `input_text` are descended into.
fn complete_under_root(
    root: &Path,
    input_text: &str,
    bounds: PathSearchBounds,
    started: Instant,
) -> Result<Option<String>, AutoCompleteError> {
    let mut walker = WalkDir::new(root)
        .max_depth(bounds.max_depth)
        // Link loops surface as entry errors and are skipped below.
        .follow_links(true)
        // Stable sort: listing order is kept within files and within dirs.
        .sort_by(|a, b| a.file_type().is_dir().cmp(&b.file_type().is_dir()))
        .into_iter();

    // Set when the directory equals the input: its children get first say.
    let mut pending: Option<(usize, String)> = None;

    while let Some(entry) = walker.next() {
        let elapsed = started.elapsed();
        if elapsed > bounds.budget {
            return Err(AutoCompleteError::BudgetExceeded {
                root: root.to_path_buf(),
                elapsed,
            });
        }

        let Ok(entry) = entry else {
            continue;
        };

        if pending
            .as_ref()
            .is_some_and(|(depth, _)| entry.depth() <= *depth)
        {
            return Ok(pending.map(|(_, hit)| hit));
        }

        let full = entry.path().to_string_lossy();
        if !entry.file_type().is_dir() {
            if starts_with_ignore_case(&full, input_text) {
                return Ok(Some(full.into_owned()));
            }
            continue;
        }

        let dir_matches = starts_with_ignore_case(&full, input_text);
        let input_within = starts_with_ignore_case(input_text, &full);

        match (dir_matches, input_within) {
            (true, true) => pending = Some((entry.depth(), with_trailing_separator(&full))),
            (true, false) => return Ok(Some(with_trailing_separator(&full))),
            (false, true) => {}
            (false, false) => walker.skip_current_dir(),
        }
    }

    Ok(pending.map(|(_, hit)| hit))
}

fn with_trailing_separator(path: &str) -> String {
    let trimmed = path.trim_end_matches(['/', '\\']);
    format!("{trimmed}{MAIN_SEPARATOR}")
}
