use std::path::PathBuf;

use crate::catalog::CommandCatalog;
use crate::history::History;
use crate::logging;
use crate::path_complete::{self, AutoCompleteError, PathSearchBounds};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoCompleteResult {
    pub input_text: String,
    pub output_text: String,
}

impl AutoCompleteResult {
    pub fn unchanged(input_text: &str) -> Self {
        Self {
            input_text: input_text.to_string(),
            output_text: input_text.to_string(),
        }
    }

    pub fn has_suggestion(&self) -> bool {
        self.output_text != self.input_text
    }
}

/// Which tier produced a completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    History,
    Catalog,
    FileSystem,
}

/// Three-tier completion: history, then catalog, then the local filesystem.
#[derive(Debug, Clone)]
pub struct AutoCompleter {
    roots: Vec<PathBuf>,
    bounds: PathSearchBounds,
}

impl Default for AutoCompleter {
    fn default() -> Self {
        Self::new(path_complete::local_roots(), PathSearchBounds::default())
    }
}

impl AutoCompleter {
    pub fn new(roots: Vec<PathBuf>, bounds: PathSearchBounds) -> Self {
        Self { roots, bounds }
    }

    pub fn complete(
        &self,
        catalog: &CommandCatalog,
        history: &History,
        input_text: &str,
    ) -> AutoCompleteResult {
        match self.find(catalog, history, input_text) {
            Ok(Some((_, output_text))) => AutoCompleteResult {
                input_text: input_text.to_string(),
                output_text,
            },
            Ok(None) => AutoCompleteResult::unchanged(input_text),
            Err(error) => {
                logging::warn(&format!("autocomplete for '{input_text}' gave up: {error}"));
                AutoCompleteResult::unchanged(input_text)
            }
        }
    }

    pub fn find(
        &self,
        catalog: &CommandCatalog,
        history: &History,
        input_text: &str,
    ) -> Result<Option<(Tier, String)>, AutoCompleteError> {
        if input_text.is_empty() {
            return Ok(None);
        }

        if let Some(hit) = complete_from_history(history, input_text) {
            return Ok(Some((Tier::History, hit.to_string())));
        }

        if let Some(hit) = complete_from_catalog(catalog, input_text) {
            return Ok(Some((Tier::Catalog, hit.to_string())));
        }

        Ok(path_complete::complete_path(&self.roots, input_text, self.bounds)?
            .map(|hit| (Tier::FileSystem, hit)))
    }
}

pub fn complete_from_history<'a>(history: &'a History, input_text: &str) -> Option<&'a str> {
    history
        .entries()
        .iter()
        .find(|entry| starts_with_ignore_case(entry, input_text))
        .map(String::as_str)
}

pub fn complete_from_catalog<'a>(catalog: &'a CommandCatalog, input_text: &str) -> Option<&'a str> {
    catalog
        .names()
        .iter()
        .find(|name| starts_with_ignore_case(name, input_text))
        .map(String::as_str)
}

pub fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    let mut text_chars = text.chars().flat_map(char::to_lowercase);
    prefix
        .chars()
        .flat_map(char::to_lowercase)
        .all(|wanted| text_chars.next() == Some(wanted))
}

#[cfg(test)]
mod tests {
    use super::{starts_with_ignore_case, AutoCompleter, Tier};
    use crate::catalog::CommandCatalog;
    use crate::history::History;
    use crate::path_complete::PathSearchBounds;

    fn completer() -> AutoCompleter {
        AutoCompleter::new(Vec::new(), PathSearchBounds::default())
    }

    #[test]
    fn case_insensitive_prefix() {
        assert!(starts_with_ignore_case("Build", "bu"));
        assert!(starts_with_ignore_case("build", ""));
        assert!(!starts_with_ignore_case("bu", "build"));
        assert!(starts_with_ignore_case("ÄRGER", "är"));
    }

    #[test]
    fn catalog_tier_returns_first_match_in_order() {
        let catalog = CommandCatalog::from_lines(["build", "run", "rust-up"]);
        let result = completer().complete(&catalog, &History::default(), "r");
        assert_eq!(result.output_text, "run");
        assert!(result.has_suggestion());
    }

    #[test]
    fn history_tier_wins_over_catalog() {
        let catalog = CommandCatalog::from_lines(["build", "run", "test"]);
        let history = History::from_entries(["test"]);
        let found = completer().find(&catalog, &history, "t").unwrap();
        assert_eq!(found, Some((Tier::History, "test".to_string())));
    }

    #[test]
    fn history_is_scanned_most_recent_first() {
        let history = History::from_entries(["deploy staging", "deploy prod"]);
        let result = completer().complete(&CommandCatalog::default(), &history, "DEP");
        assert_eq!(result.output_text, "deploy staging");
    }

    #[test]
    fn empty_input_is_left_alone() {
        let history = History::from_entries(["anything"]);
        let result = completer().complete(&CommandCatalog::default(), &history, "");
        assert_eq!(result.output_text, "");
        assert!(!result.has_suggestion());
    }

    #[test]
    fn no_match_returns_input_unchanged() {
        let catalog = CommandCatalog::from_lines(["build"]);
        let result = completer().complete(&catalog, &History::default(), "zzz");
        assert_eq!(result.output_text, "zzz");
    }
}
