use std::collections::VecDeque;

pub const DEFAULT_RETENTION_LINES: usize = 2000;
pub const DEFAULT_NEAR_BOTTOM_ROWS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub text: String,
}

/// What a single mutation did to the buffer and viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LogMutation {
    pub appended: usize,
    pub evicted: usize,
    pub pinned: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollAction {
    LineUp,
    LineDown,
    PageUp,
    PageDown,
    Top,
    Bottom,
}

/// Append-only, arrival-ordered log buffer with a row-addressed viewport.
/// `offset` is the index of the first visible row.
#[derive(Debug, Clone)]
pub struct LogView {
    lines: VecDeque<LogLine>,
    offset: usize,
    viewport_rows: usize,
    retention: usize,
    near_bottom_rows: usize,
}

impl Default for LogView {
    fn default() -> Self {
        Self::new(DEFAULT_RETENTION_LINES, DEFAULT_NEAR_BOTTOM_ROWS)
    }
}

impl LogView {
    pub fn new(retention: usize, near_bottom_rows: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            offset: 0,
            viewport_rows: 1,
            retention: retention.max(1),
            near_bottom_rows,
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn viewport_rows(&self) -> usize {
        self.viewport_rows
    }

    pub fn max_offset(&self) -> usize {
        self.lines.len().saturating_sub(self.viewport_rows)
    }

    pub fn distance_from_bottom(&self) -> usize {
        self.max_offset().saturating_sub(self.offset)
    }

    pub fn is_near_bottom(&self) -> bool {
        self.distance_from_bottom() <= self.near_bottom_rows
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|line| line.text.as_str())
    }

    pub fn visible(&self) -> impl Iterator<Item = &str> {
        self.lines
            .iter()
            .skip(self.offset)
            .take(self.viewport_rows)
            .map(|line| line.text.as_str())
    }

    pub fn append(&mut self, text: impl Into<String>) -> LogMutation {
        let text = text.into();
        self.mutate(|lines| {
            lines.push_back(LogLine { text });
            1
        })
    }

    /// Applies a full ordered snapshot and appends only the lines not yet
    /// shown. See [`LogView::snapshot_overlap`].
    pub fn replace_all(&mut self, snapshot: Vec<String>) -> LogMutation {
        let overlap = self.snapshot_overlap(&snapshot);
        if overlap == snapshot.len() {
            return LogMutation {
                appended: 0,
                evicted: 0,
                pinned: self.is_near_bottom(),
            };
        }
        self.mutate(|lines| {
            let fresh = snapshot.len() - overlap;
            lines.extend(
                snapshot
                    .into_iter()
                    .skip(overlap)
                    .map(|text| LogLine { text }),
            );
            fresh
        })
    }

    /// How many leading snapshot lines are already shown: the longest
    /// snapshot prefix whose tail the buffer ends with. The whole prefix
    /// must be present unless the buffer is at retention, where the oldest
    /// part of the prefix may already have been evicted.
    pub fn snapshot_overlap(&self, snapshot: &[String]) -> usize {
        let at_retention = self.lines.len() >= self.retention;
        (1..=snapshot.len())
            .rev()
            .find(|&shown| {
                let compared = shown.min(self.lines.len());
                if compared < shown && !at_retention {
                    return false;
                }
                compared > 0
                    && self
                        .lines
                        .iter()
                        .skip(self.lines.len() - compared)
                        .zip(&snapshot[shown - compared..shown])
                        .all(|(line, text)| &line.text == text)
            })
            .unwrap_or(0)
    }

    pub fn set_viewport_rows(&mut self, rows: usize) {
        let rows = rows.max(1);
        if rows == self.viewport_rows {
            return;
        }
        let pinned = self.is_near_bottom();
        self.viewport_rows = rows;
        self.offset = if pinned {
            self.max_offset()
        } else {
            self.offset.min(self.max_offset())
        };
    }

    pub fn scroll(&mut self, action: ScrollAction) {
        let page = self.viewport_rows.max(1);
        let max = self.max_offset();
        self.offset = match action {
            ScrollAction::LineUp => self.offset.saturating_sub(1),
            ScrollAction::LineDown => (self.offset + 1).min(max),
            ScrollAction::PageUp => self.offset.saturating_sub(page),
            ScrollAction::PageDown => (self.offset + page).min(max),
            ScrollAction::Top => 0,
            ScrollAction::Bottom => max,
        };
    }

    #[cfg(test)]
    pub fn set_offset(&mut self, offset: usize) {
        self.offset = offset.min(self.max_offset());
    }

    fn mutate<F>(&mut self, apply: F) -> LogMutation
    where
        F: FnOnce(&mut VecDeque<LogLine>) -> usize,
    {
        let pinned = self.is_near_bottom();
        let appended = apply(&mut self.lines);
        let mut evicted = 0usize;
        while self.lines.len() > self.retention {
            self.lines.pop_front();
            evicted += 1;
        }
        self.offset = if pinned {
            self.max_offset()
        } else {
            self.offset.saturating_sub(evicted).min(self.max_offset())
        };
        LogMutation {
            appended,
            evicted,
            pinned,
        }
    }
}
