/// Previously executed inputs, most recent first, without exact duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    entries: Vec<String>,
}

impl History {
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut history = Self::default();
        let collected: Vec<String> = entries.into_iter().map(Into::into).collect();
        for entry in collected.into_iter().rev() {
            history.insert(&entry);
        }
        history
    }

    /// Moves `text` to the front, removing any earlier exact occurrence.
    pub fn insert(&mut self, text: &str) {
        self.entries.retain(|entry| entry != text);
        self.entries.insert(0, text.to_string());
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::History;

    #[test]
    fn insert_prepends_new_entries() {
        let mut history = History::default();
        history.insert("build");
        history.insert("run");
        assert_eq!(history.entries(), ["run", "build"]);
    }

    #[test]
    fn insert_moves_existing_entry_to_front() {
        let mut history = History::from_entries(["a", "b", "c"]);
        history.insert("c");
        assert_eq!(history.entries(), ["c", "a", "b"]);
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn duplicates_are_exact_match_only() {
        let mut history = History::default();
        history.insert("Build");
        history.insert("build");
        assert_eq!(history.entries(), ["build", "Build"]);
    }

    #[test]
    fn from_entries_keeps_order_and_drops_later_duplicates() {
        let history = History::from_entries(["x", "y", "x"]);
        assert_eq!(history.entries(), ["x", "y"]);
    }

    #[test]
    fn never_holds_duplicates_after_many_inserts() {
        let mut history = History::default();
        for text in ["a", "b", "a", "c", "b", "a", "a"] {
            history.insert(text);
        }
        let mut sorted = history.entries().to_vec();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), history.len());
        assert_eq!(history.entries()[0], "a");
    }
}
