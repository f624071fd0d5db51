use crate::autocomplete::AutoCompleteResult;
use crate::resolver::ExecuteResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    Dismissed,
    Executed,
    ErrorDialog(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Executing(String),
    Closed(CloseReason),
}

/// Result of handing an execution outcome back to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecuteOutcome {
    /// Text should be recorded in history.
    Executed(String),
    NotFound,
    Failed(String),
}

/// Headless model of the console input: typed text, a highlighted
/// completion suffix and the execute lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleSession {
    typed: String,
    suggestion_suffix: String,
    state: SessionState,
    error_flashes: u32,
}

impl Default for ConsoleSession {
    fn default() -> Self {
        Self {
            typed: String::new(),
            suggestion_suffix: String::new(),
            state: SessionState::Idle,
            error_flashes: 0,
        }
    }
}

impl ConsoleSession {
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.state, SessionState::Closed(_))
    }

    pub fn error_flashes(&self) -> u32 {
        self.error_flashes
    }

    /// Replaces the typed text; any highlighted suggestion is dropped.
    pub fn set_input(&mut self, text: &str) {
        self.typed = text.to_string();
        self.suggestion_suffix.clear();
    }

    /// The part of the field the user actually typed.
    pub fn typed_text(&self) -> &str {
        &self.typed
    }

    pub fn suggestion_suffix(&self) -> &str {
        &self.suggestion_suffix
    }

    pub fn display_text(&self) -> String {
        format!("{}{}", self.typed, self.suggestion_suffix)
    }

    /// Applies a completion only if it was computed for the current typed
    /// text. Stale results are dropped.
    pub fn apply_completion(&mut self, result: &AutoCompleteResult) -> bool {
        if self.is_closed() || !result.has_suggestion() {
            return false;
        }
        if self.typed != result.input_text {
            return false;
        }

        // The completion's own casing replaces what was typed.
        let split = folded_prefix_end(&result.output_text, &result.input_text);
        self.typed = result.output_text[..split].to_string();
        self.suggestion_suffix = result.output_text[split..].to_string();
        true
    }

    /// Accepts the highlighted suggestion into the typed text (Tab).
    pub fn accept_suggestion(&mut self) {
        let suffix = std::mem::take(&mut self.suggestion_suffix);
        self.typed.push_str(&suffix);
    }

    /// Enter: empty input closes the session, anything else starts executing
    /// and clears the field.
    pub fn submit(&mut self) -> Option<String> {
        if !matches!(self.state, SessionState::Idle) {
            return None;
        }

        let text = self.display_text();
        self.typed.clear();
        self.suggestion_suffix.clear();

        if text.is_empty() {
            self.state = SessionState::Closed(CloseReason::Dismissed);
            return None;
        }

        self.state = SessionState::Executing(text.clone());
        Some(text)
    }

    pub fn finish_execute(&mut self, result: ExecuteResult) -> ExecuteOutcome {
        if let Some(error) = result.error {
            let message = error_chain_message(&error);
            self.state = SessionState::Closed(CloseReason::ErrorDialog(message.clone()));
            return ExecuteOutcome::Failed(message);
        }

        if result.success {
            self.state = SessionState::Closed(CloseReason::Executed);
            return ExecuteOutcome::Executed(result.text);
        }

        self.state = SessionState::Idle;
        self.error_flashes += 1;
        ExecuteOutcome::NotFound
    }

    pub fn escape(&mut self) -> bool {
        if self.is_closed() {
            return false;
        }
        self.state = SessionState::Closed(CloseReason::Dismissed);
        true
    }
}

/// Every message in the `source()` chain, one per line.
pub fn error_chain_message(error: &dyn std::error::Error) -> String {
    let mut lines = vec![error.to_string()];
    let mut current = error.source();
    while let Some(cause) = current {
        lines.push(cause.to_string());
        current = cause.source();
    }
    lines.join("\n")
}

/// Byte offset in `text` just past the characters whose lowercase forms
/// cover the lowercase form of `prefix`. Folding may change the char count.
fn folded_prefix_end(text: &str, prefix: &str) -> usize {
    let wanted = prefix.chars().flat_map(char::to_lowercase).count();
    let mut folded = 0;
    for (index, ch) in text.char_indices() {
        if folded >= wanted {
            return index;
        }
        folded += ch.to_lowercase().count();
    }
    text.len()
}

#[cfg(test)]
mod tests {
    use super::{CloseReason, ConsoleSession, ExecuteOutcome, SessionState};
    use crate::autocomplete::AutoCompleteResult;
    use crate::resolver::ExecuteResult;

    fn completion(input: &str, output: &str) -> AutoCompleteResult {
        AutoCompleteResult {
            input_text: input.to_string(),
            output_text: output.to_string(),
        }
    }

    #[test]
    fn applies_completion_for_current_text() {
        let mut session = ConsoleSession::default();
        session.set_input("bu");
        assert!(session.apply_completion(&completion("bu", "build")));
        assert_eq!(session.typed_text(), "bu");
        assert_eq!(session.suggestion_suffix(), "ild");
        assert_eq!(session.display_text(), "build");
    }

    #[test]
    fn drops_stale_completion() {
        let mut session = ConsoleSession::default();
        session.set_input("b");
        session.set_input("bx");
        assert!(!session.apply_completion(&completion("b", "build")));
        assert_eq!(session.display_text(), "bx");
    }

    #[test]
    fn completion_casing_replaces_typed_prefix() {
        let mut session = ConsoleSession::default();
        session.set_input("BU");
        assert!(session.apply_completion(&completion("BU", "build")));
        assert_eq!(session.typed_text(), "bu");
        assert_eq!(session.suggestion_suffix(), "ild");
    }

    #[test]
    fn result_without_suggestion_is_not_applied() {
        let mut session = ConsoleSession::default();
        session.set_input("zz");
        assert!(!session.apply_completion(&completion("zz", "zz")));
        assert_eq!(session.suggestion_suffix(), "");
    }

    #[test]
    fn split_follows_case_folding_not_char_count() {
        let mut session = ConsoleSession::default();
        // "İ" lowercases to two chars: 'i' plus a combining dot.
        session.set_input("i\u{307}");
        assert!(session.apply_completion(&completion("i\u{307}", "İstanbul")));
        assert_eq!(session.typed_text(), "İ");
        assert_eq!(session.suggestion_suffix(), "stanbul");
    }

    #[test]
    fn accept_suggestion_moves_suffix_into_typed_text() {
        let mut session = ConsoleSession::default();
        session.set_input("bu");
        session.apply_completion(&completion("bu", "build"));
        session.accept_suggestion();
        assert_eq!(session.typed_text(), "build");
        assert_eq!(session.suggestion_suffix(), "");
        assert!(!session.apply_completion(&completion("bu", "bundle")));
    }

    #[test]
    fn empty_submit_dismisses() {
        let mut session = ConsoleSession::default();
        assert_eq!(session.submit(), None);
        assert_eq!(session.state(), &SessionState::Closed(CloseReason::Dismissed));
    }

    #[test]
    fn submit_includes_suggestion_and_clears_field() {
        let mut session = ConsoleSession::default();
        session.set_input("bu");
        session.apply_completion(&completion("bu", "build"));
        assert_eq!(session.submit(), Some("build".to_string()));
        assert_eq!(session.display_text(), "");
        assert_eq!(session.state(), &SessionState::Executing("build".to_string()));
    }

    #[test]
    fn not_found_returns_to_idle_with_flash() {
        let mut session = ConsoleSession::default();
        session.set_input("nope");
        session.submit();
        let outcome = session.finish_execute(ExecuteResult::from_outcome("nope", Ok(false)));
        assert_eq!(outcome, ExecuteOutcome::NotFound);
        assert_eq!(session.state(), &SessionState::Idle);
        assert_eq!(session.error_flashes(), 1);
    }

    #[test]
    fn success_closes_session() {
        let mut session = ConsoleSession::default();
        session.set_input("build");
        session.submit();
        let outcome = session.finish_execute(ExecuteResult::from_outcome("build", Ok(true)));
        assert_eq!(outcome, ExecuteOutcome::Executed("build".to_string()));
        assert_eq!(session.state(), &SessionState::Closed(CloseReason::Executed));
    }

    #[test]
    fn escape_closes_only_once() {
        let mut session = ConsoleSession::default();
        assert!(session.escape());
        assert!(!session.escape());
    }
}
