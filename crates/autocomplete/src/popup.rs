//! Results popup: rendered rows, open flag and the active (highlighted) row.

use std::ops::Range;

/// Lifecycle of one control.
///
/// `Start` only exists before mount. `Committed` means the display text and
/// canonical value came from a pick (or an accepted free-text entry) and
/// nothing has been typed since. Every other phase is mid-interaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Start,
    Ready,
    Searching,
    HasResults,
    Empty,
    Committed,
}

impl Phase {
    pub fn is_mid_interaction(self) -> bool {
        matches!(
            self,
            Phase::Ready | Phase::Searching | Phase::HasResults | Phase::Empty
        )
    }
}

/// One selectable row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultRow {
    /// Stable DOM-style id; empty until the popup assigns one.
    pub id: String,
    pub value: String,
    pub label: String,
    pub disabled: bool,
    /// Rows that are links navigate instead of committing.
    pub href: Option<String>,
    /// Byte ranges of `label` that matched the query.
    pub highlights: Vec<Range<usize>>,
}

impl ResultRow {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            value: value.into(),
            label: label.into(),
            disabled: false,
            href: None,
            highlights: Vec::new(),
        }
    }

    /// Label split into `(text, highlighted)` runs for rendering.
    pub fn segments(&self) -> Vec<(&str, bool)> {
        let mut out = Vec::with_capacity(self.highlights.len() * 2 + 1);
        let mut pos = 0;
        for range in &self.highlights {
            let (Some(plain), Some(hit)) = (
                self.label.get(pos..range.start),
                self.label.get(range.clone()),
            ) else {
                continue;
            };
            if !plain.is_empty() {
                out.push((plain, false));
            }
            out.push((hit, true));
            pos = range.end;
        }
        if let Some(rest) = self.label.get(pos..).filter(|s| !s.is_empty()) {
            out.push((rest, false));
        }
        out
    }
}

/// What the popup shows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum PopupContent {
    #[default]
    None,
    /// Rows built from the local list; the host renders them from [`ResultRow`]s.
    Rows,
    /// Server-rendered fragment, kept verbatim for the host to insert.
    Markup(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

#[derive(Debug)]
pub struct Popup {
    results_id: String,
    next_row: u64,
    rows: Vec<ResultRow>,
    content: PopupContent,
    active: Option<usize>,
    open: bool,
}

impl Popup {
    /// `results_id` is the id of the results container; rows without an id
    /// get `<results_id>-option-<n>`.
    pub fn new(results_id: impl Into<String>) -> Self {
        let results_id = results_id.into();
        Self {
            results_id: if results_id.is_empty() {
                "autocomplete".to_string()
            } else {
                results_id
            },
            next_row: 0,
            rows: Vec::new(),
            content: PopupContent::None,
            active: None,
            open: false,
        }
    }

    pub fn results_id(&self) -> &str {
        &self.results_id
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Value for the input's `aria-expanded`.
    pub fn expanded(&self) -> bool {
        self.open
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn content(&self) -> &PopupContent {
        &self.content
    }

    pub fn active_row(&self) -> Option<&ResultRow> {
        self.active.and_then(|i| self.rows.get(i))
    }

    /// Value for the input's `aria-activedescendant`.
    pub fn active_descendant(&self) -> Option<&str> {
        self.active_row().map(|r| r.id.as_str())
    }

    pub fn row_by_id(&self, id: &str) -> Option<&ResultRow> {
        self.rows.iter().find(|r| r.id == id)
    }

    pub(crate) fn replace(&mut self, mut rows: Vec<ResultRow>, content: PopupContent) {
        for row in rows.iter_mut().filter(|r| r.id.is_empty()) {
            self.next_row += 1;
            row.id = format!("{}-option-{}", self.results_id, self.next_row);
        }
        self.rows = rows;
        self.content = content;
        self.active = None;
    }

    pub(crate) fn clear(&mut self) {
        self.rows.clear();
        self.content = PopupContent::None;
        self.active = None;
    }

    /// Returns `true` if the popup was closed before.
    pub(crate) fn open(&mut self) -> bool {
        !std::mem::replace(&mut self.open, true)
    }

    /// Returns `true` if the popup was open before. The active row is dropped.
    pub(crate) fn close(&mut self) -> bool {
        self.active = None;
        std::mem::replace(&mut self.open, false)
    }

    /// Move the highlight, wrapping at both ends and skipping disabled rows.
    /// Does nothing while closed.
    pub(crate) fn move_active(&mut self, direction: Direction) -> Option<&ResultRow> {
        if !self.open {
            return None;
        }
        let selectable: Vec<usize> = self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, r)| !r.disabled)
            .map(|(i, _)| i)
            .collect();
        let (first, last) = (*selectable.first()?, *selectable.last()?);
        let pos = self.active.and_then(|a| selectable.iter().position(|&i| i == a));

        let next = match (direction, pos) {
            (Direction::Next, None) => first,
            (Direction::Previous, None) => last,
            (Direction::Next, Some(p)) => selectable.get(p + 1).copied().unwrap_or(first),
            (Direction::Previous, Some(0)) => last,
            (Direction::Previous, Some(p)) => selectable[p - 1],
        };
        self.active = Some(next);
        log::trace!(target: "autocomplete.popup", "active row -> {}", self.rows[next].id);
        self.rows.get(next)
    }
}
