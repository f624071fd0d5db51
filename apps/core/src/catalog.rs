use std::collections::HashSet;
use std::fmt::{Display, Formatter};

use crate::process::{ProcessError, ProcessRunner};
use crate::template::{self, TemplateError};

/// Command names reported by the list program, case-insensitively unique,
/// in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandCatalog {
    names: Vec<String>,
}

impl CommandCatalog {
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut names = Vec::new();
        for line in lines {
            let Some(name) = first_token(line.as_ref()) else {
                continue;
            };
            if seen.insert(name.to_lowercase()) {
                names.push(name.to_string());
            }
        }
        Self { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        let wanted = name.to_lowercase();
        self.names.iter().any(|candidate| candidate.to_lowercase() == wanted)
    }
}

#[derive(Debug)]
pub enum CatalogError {
    Template(TemplateError),
    Process(ProcessError),
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Template(_) => write!(f, "invalid command list program"),
            Self::Process(_) => write!(f, "failed to load command list"),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Template(error) => Some(error),
            Self::Process(error) => Some(error),
        }
    }
}

impl From<TemplateError> for CatalogError {
    fn from(value: TemplateError) -> Self {
        Self::Template(value)
    }
}

impl From<ProcessError> for CatalogError {
    fn from(value: ProcessError) -> Self {
        Self::Process(value)
    }
}

/// Runs the configured list program. The catalog is rebuilt on every call.
pub fn load(
    list_template: &str,
    runner: &dyn ProcessRunner,
) -> Result<CommandCatalog, CatalogError> {
    let parsed = template::parse(list_template)?;
    let lines = runner.execute(&parsed.program, &parsed.args)?;
    Ok(CommandCatalog::from_lines(lines))
}

fn first_token(line: &str) -> Option<&str> {
    line.split_whitespace().next()
}

#[cfg(test)]
mod tests {
    use super::CommandCatalog;

    #[test]
    fn keeps_first_token_of_each_line() {
        let catalog = CommandCatalog::from_lines(["build   Build the project", "run", "test\tRun tests"]);
        assert_eq!(catalog.names(), ["build", "run", "test"]);
    }

    #[test]
    fn dedupes_case_insensitively_keeping_first() {
        let catalog = CommandCatalog::from_lines(["Deploy", "deploy prod", "DEPLOY", "lint"]);
        assert_eq!(catalog.names(), ["Deploy", "lint"]);
    }

    #[test]
    fn skips_blank_lines() {
        let catalog = CommandCatalog::from_lines(["", "  ", "run"]);
        assert_eq!(catalog.names(), ["run"]);
    }

    #[test]
    fn membership_ignores_case() {
        let catalog = CommandCatalog::from_lines(["Build"]);
        assert!(catalog.contains("BUILD"));
        assert!(!catalog.contains("buil"));
    }
}
