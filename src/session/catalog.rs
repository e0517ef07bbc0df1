use super::validation::ValidationError;

/// Entry the backend lists alongside real scripts but which cannot be run.
pub const PLACEHOLDER_ENTRY: &str = "package-info.java";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptCatalogEntry {
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionChange {
    pub demoted: Option<usize>,
    pub promoted: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ScriptCatalog {
    entries: Vec<ScriptCatalogEntry>,
    selected: Option<usize>,
    loaded: bool,
}

impl ScriptCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fetched(names: Vec<String>) -> Self {
        let mut catalog = Self::new();
        catalog.load(names);
        catalog
    }

    /// Installs the fetched listing. The catalog is immutable for the session,
    /// so later listings are ignored and `false` is returned.
    pub fn load(&mut self, names: Vec<String>) -> bool {
        if self.loaded {
            return false;
        }
        self.entries = names
            .into_iter()
            .filter(|name| name != PLACEHOLDER_ENTRY)
            .map(|name| ScriptCatalogEntry { name })
            .collect();
        self.loaded = true;
        true
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn entries(&self) -> &[ScriptCatalogEntry] {
        &self.entries
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.name.as_str()).collect()
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected(&self) -> Option<&ScriptCatalogEntry> {
        self.selected.and_then(|idx| self.entries.get(idx))
    }

    #[cfg(test)]
    pub fn is_selected(&self, idx: usize) -> bool {
        self.selected == Some(idx)
    }

    /// Selects the entry at `idx`, demoting any previous selection. Returns
    /// `None` when the index is out of range or already selected.
    pub fn select_index(&mut self, idx: usize) -> Option<SelectionChange> {
        if idx >= self.entries.len() || self.selected == Some(idx) {
            return None;
        }
        let demoted = self.selected.replace(idx);
        Some(SelectionChange {
            demoted,
            promoted: idx,
        })
    }

    pub fn select(&mut self, name: &str) -> Result<Option<SelectionChange>, ValidationError> {
        let Some(idx) = self.entries.iter().position(|entry| entry.name == name) else {
            return Err(ValidationError::UnknownScript(name.to_owned()));
        };
        Ok(self.select_index(idx))
    }

    pub fn select_next(&mut self) -> Option<SelectionChange> {
        if self.entries.is_empty() {
            return None;
        }
        let next = match self.selected {
            Some(idx) => (idx + 1).min(self.entries.len() - 1),
            None => 0,
        };
        self.select_index(next)
    }

    pub fn select_prev(&mut self) -> Option<SelectionChange> {
        if self.entries.is_empty() {
            return None;
        }
        let prev = match self.selected {
            Some(idx) => idx.saturating_sub(1),
            None => 0,
        };
        self.select_index(prev)
    }
}
