use std::fmt::{Display, Formatter};
use std::sync::Arc;

use crate::action_executor::{existing_path, LaunchError, PathOpener, SystemPathOpener};
use crate::catalog::{self, CatalogError, CommandCatalog};
use crate::process::{ProcessError, ProcessRunner, SystemProcessRunner};
use crate::template::{self, TemplateError};

#[derive(Debug)]
pub enum ResolveError {
    Catalog(CatalogError),
    Template(TemplateError),
    Process(ProcessError),
    Open(LaunchError),
}

impl Display for ResolveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Catalog(_) => write!(f, "command list unavailable"),
            Self::Template(_) => write!(f, "invalid command execute program"),
            Self::Process(_) => write!(f, "command failed"),
            Self::Open(_) => write!(f, "could not open path"),
        }
    }
}

impl std::error::Error for ResolveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Catalog(error) => Some(error),
            Self::Template(error) => Some(error),
            Self::Process(error) => Some(error),
            Self::Open(error) => Some(error),
        }
    }
}

impl From<CatalogError> for ResolveError {
    fn from(value: CatalogError) -> Self {
        Self::Catalog(value)
    }
}

impl From<TemplateError> for ResolveError {
    fn from(value: TemplateError) -> Self {
        Self::Template(value)
    }
}

impl From<ProcessError> for ResolveError {
    fn from(value: ProcessError) -> Self {
        Self::Process(value)
    }
}

impl From<LaunchError> for ResolveError {
    fn from(value: LaunchError) -> Self {
        Self::Open(value)
    }
}

/// Outcome of one execution request, handed back to the console session.
#[derive(Debug)]
pub struct ExecuteResult {
    pub text: String,
    pub success: bool,
    pub error: Option<ResolveError>,
}

impl ExecuteResult {
    pub fn from_outcome(text: &str, outcome: Result<bool, ResolveError>) -> Self {
        match outcome {
            Ok(success) => Self {
                text: text.to_string(),
                success,
                error: None,
            },
            Err(error) => Self {
                text: text.to_string(),
                success: false,
                error: Some(error),
            },
        }
    }
}

/// Decides whether user text names a catalog command or a path and acts on it.
#[derive(Clone)]
pub struct CommandResolver {
    list_template: String,
    execute_template: String,
    runner: Arc<dyn ProcessRunner>,
    opener: Arc<dyn PathOpener>,
}

impl CommandResolver {
    pub fn new(list_template: &str, execute_template: &str) -> Self {
        Self {
            list_template: list_template.to_string(),
            execute_template: execute_template.to_string(),
            runner: Arc::new(SystemProcessRunner),
            opener: Arc::new(SystemPathOpener),
        }
    }

    pub fn with_runner(mut self, runner: Arc<dyn ProcessRunner>) -> Self {
        self.runner = runner;
        self
    }

    pub fn with_opener(mut self, opener: Arc<dyn PathOpener>) -> Self {
        self.opener = opener;
        self
    }

    pub fn load_catalog(&self) -> Result<CommandCatalog, CatalogError> {
        catalog::load(&self.list_template, self.runner.as_ref())
    }

    /// Returns `Ok(false)` when the text is neither a command nor an
    /// existing path.
    pub fn execute_user_command(&self, text: &str) -> Result<bool, ResolveError> {
        let text = text.trim();
        let (command_name, user_args) = split_command(text);

        let catalog = self.load_catalog()?;
        if catalog.contains(command_name) {
            self.execute_command_process(command_name, user_args)?;
            return Ok(true);
        }

        self.execute_file_system(text)
    }

    pub fn execute_command_process(
        &self,
        command_name: &str,
        user_args: &str,
    ) -> Result<(), ResolveError> {
        let parsed = template::parse(&self.execute_template)?;
        let args = compose_args(&[&parsed.args, command_name, user_args]);
        self.runner.execute(&parsed.program, &args)?;
        Ok(())
    }

    pub fn execute_file_system(&self, text: &str) -> Result<bool, ResolveError> {
        match existing_path(text) {
            Ok(path) => {
                self.opener.open(&path)?;
                Ok(true)
            }
            Err(LaunchError::EmptyPath | LaunchError::MissingPath(_)) => Ok(false),
            Err(error) => Err(error.into()),
        }
    }
}

/// Splits trimmed text at the first space into command name and arguments.
pub fn split_command(text: &str) -> (&str, &str) {
    match text.split_once(' ') {
        Some((name, args)) => (name.trim(), args.trim()),
        None => (text, ""),
    }
}

/// Trims each segment, drops empty ones and joins the rest with single spaces.
pub fn compose_args(segments: &[&str]) -> String {
    segments
        .iter()
        .map(|segment| segment.trim())
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::{compose_args, split_command};

    #[test]
    fn split_command_separates_name_and_args() {
        assert_eq!(split_command("build --release  "), ("build", "--release"));
        assert_eq!(split_command("build"), ("build", ""));
    }

    #[test]
    fn compose_args_drops_empty_segments() {
        assert_eq!(compose_args(&["", " build ", "--release"]), "build --release");
        assert_eq!(compose_args(&["run -q", "deploy", ""]), "run -q deploy");
    }
}
