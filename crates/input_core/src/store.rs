//! Field store: values, caret positions, selections and disabled flags.
//!
//! The store performs no layout or measurement. Controls translate key presses
//! into the editing calls below and read revisions to detect text changes.

use crate::id::FieldId;
use crate::selection::SelectionRange;
use crate::state::FieldState;
use crate::text::{
    clamp_to_char_boundary, filter_single_line, next_cursor_boundary, prev_cursor_boundary,
};
use std::collections::HashMap;

/// Initial description of a field handed to [`FieldStore::register`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: Option<String>,
    pub value: String,
    pub disabled: bool,
}

impl FieldSpec {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }
}

/// Store for a small set of form fields.
///
/// # Example
///
/// ```
/// use input_core::{FieldSpec, FieldStore};
///
/// let mut store = FieldStore::new();
/// let id = store.register(FieldSpec::named("member").with_value("Ann"));
///
/// store.insert_text(id, "a");
/// assert_eq!(store.get(id), Some("Anna"));
/// assert_eq!(store.form_entries(), vec![("member", "Anna")]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct FieldStore {
    fields: HashMap<FieldId, FieldState>,
    order: Vec<FieldId>,
    next_id: u64,
}

impl FieldStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new field; the caret starts at the end of the initial value.
    pub fn register(&mut self, spec: FieldSpec) -> FieldId {
        self.next_id = self.next_id.wrapping_add(1);
        let id = FieldId::from_raw(self.next_id);
        let caret = spec.value.len();
        self.fields.insert(
            id,
            FieldState {
                name: spec.name,
                value: spec.value,
                value_rev: 0,
                disabled: spec.disabled,
                caret,
                selection_anchor: None,
            },
        );
        self.order.push(id);
        id
    }

    pub fn has(&self, id: FieldId) -> bool {
        self.fields.contains_key(&id)
    }

    pub fn get(&self, id: FieldId) -> Option<&str> {
        self.fields.get(&id).map(|s| s.value.as_str())
    }

    /// Value of the field, or `""` for unknown ids.
    pub fn value(&self, id: FieldId) -> &str {
        self.get(id).unwrap_or("")
    }

    pub fn name(&self, id: FieldId) -> Option<&str> {
        self.fields.get(&id).and_then(|s| s.name.as_deref())
    }

    pub fn caret(&self, id: FieldId) -> Option<usize> {
        self.fields.get(&id).map(|s| s.caret)
    }

    pub fn selection(&self, id: FieldId) -> Option<SelectionRange> {
        let st = self.fields.get(&id)?;
        selection_range(&st.value, st.selection_anchor, st.caret)
    }

    /// Increments on every value change; `0` for unknown ids.
    pub fn value_revision(&self, id: FieldId) -> u64 {
        self.fields.get(&id).map_or(0, |s| s.value_rev)
    }

    /// Overwrite the value. The caret moves to the end and any selection is dropped.
    ///
    /// Returns `true` if the value changed.
    pub fn set(&mut self, id: FieldId, value: &str) -> bool {
        let Some(st) = self.fields.get_mut(&id) else {
            return false;
        };
        let value = filter_single_line(value);
        let changed = st.value != value;
        if changed {
            st.value.clear();
            st.value.push_str(&value);
            mark_text_dirty(st);
        }
        st.caret = st.value.len();
        st.selection_anchor = None;
        changed
    }

    pub fn is_disabled(&self, id: FieldId) -> bool {
        self.fields.get(&id).is_some_and(|s| s.disabled)
    }

    /// Returns `true` if the flag changed.
    pub fn set_disabled(&mut self, id: FieldId, disabled: bool) -> bool {
        let Some(st) = self.fields.get_mut(&id) else {
            return false;
        };
        let changed = st.disabled != disabled;
        st.disabled = disabled;
        changed
    }

    /// `(name, value)` pairs of enabled, named fields in registration order.
    pub fn form_entries(&self) -> Vec<(&str, &str)> {
        self.order
            .iter()
            .filter_map(|id| self.fields.get(id))
            .filter(|st| !st.disabled)
            .filter_map(|st| st.name.as_deref().map(|name| (name, st.value.as_str())))
            .collect()
    }

    pub fn focus(&mut self, id: FieldId) {
        if let Some(st) = self.fields.get_mut(&id) {
            clamp_state(st);
            st.selection_anchor = None;
        }
    }

    pub fn blur(&mut self, id: FieldId) {
        self.focus(id);
    }

    /// Insert text at the caret, replacing the selection if there is one.
    ///
    /// Newlines are stripped.
    pub fn insert_text(&mut self, id: FieldId, s: &str) {
        let Some(st) = self.fields.get_mut(&id) else {
            return;
        };
        clamp_state(st);
        let s = filter_single_line(s);
        if s.is_empty() {
            return;
        }

        delete_selection_if_any(st);

        let caret = st.caret;
        st.value.insert_str(caret, &s);
        st.caret = clamp_to_char_boundary(&st.value, caret + s.len());
        mark_text_dirty(st);
    }

    /// Delete the selection, or the char before the caret.
    pub fn backspace(&mut self, id: FieldId) {
        let Some(st) = self.fields.get_mut(&id) else {
            return;
        };
        clamp_state(st);
        if delete_selection_if_any(st) || st.caret == 0 {
            return;
        }

        let prev = prev_cursor_boundary(&st.value, st.caret);
        st.value.drain(prev..st.caret);
        st.caret = prev;
        mark_text_dirty(st);
    }

    /// Delete the selection, or the char after the caret.
    pub fn delete(&mut self, id: FieldId) {
        let Some(st) = self.fields.get_mut(&id) else {
            return;
        };
        clamp_state(st);
        if delete_selection_if_any(st) || st.caret >= st.value.len() {
            return;
        }

        let next = next_cursor_boundary(&st.value, st.caret);
        st.value.drain(st.caret..next);
        mark_text_dirty(st);
    }

    pub fn move_caret_left(&mut self, id: FieldId) {
        self.move_caret(id, |st| match selection_range(&st.value, st.selection_anchor, st.caret) {
            Some(sel) => sel.start,
            None => prev_cursor_boundary(&st.value, st.caret),
        });
    }

    pub fn move_caret_right(&mut self, id: FieldId) {
        self.move_caret(id, |st| match selection_range(&st.value, st.selection_anchor, st.caret) {
            Some(sel) => sel.end,
            None => next_cursor_boundary(&st.value, st.caret),
        });
    }

    pub fn move_caret_to_start(&mut self, id: FieldId) {
        self.move_caret(id, |_| 0);
    }

    pub fn move_caret_to_end(&mut self, id: FieldId) {
        self.move_caret(id, |st| st.value.len());
    }

    pub fn select_all(&mut self, id: FieldId) {
        if let Some(st) = self.fields.get_mut(&id) {
            st.caret = st.value.len();
            st.selection_anchor = (!st.value.is_empty()).then_some(0);
        }
    }

    fn move_caret(&mut self, id: FieldId, target: impl FnOnce(&FieldState) -> usize) {
        if let Some(st) = self.fields.get_mut(&id) {
            clamp_state(st);
            st.caret = clamp_to_char_boundary(&st.value, target(st));
            st.selection_anchor = None;
        }
    }
}

// --- Internal helper functions ---

fn selection_range(value: &str, anchor: Option<usize>, caret: usize) -> Option<SelectionRange> {
    let a = clamp_to_char_boundary(value, anchor?);
    let c = clamp_to_char_boundary(value, caret);
    (a != c).then(|| SelectionRange::new(a, c))
}

fn delete_selection_if_any(st: &mut FieldState) -> bool {
    let Some(sel) = selection_range(&st.value, st.selection_anchor, st.caret) else {
        st.selection_anchor = None;
        return false;
    };

    st.value.drain(sel.start..sel.end);
    st.caret = sel.start;
    st.selection_anchor = None;
    mark_text_dirty(st);
    true
}

fn clamp_state(st: &mut FieldState) {
    st.caret = clamp_to_char_boundary(&st.value, st.caret);
    if let Some(a) = st.selection_anchor {
        st.selection_anchor = Some(clamp_to_char_boundary(&st.value, a));
    }
}

fn mark_text_dirty(st: &mut FieldState) {
    st.value_rev = st.value_rev.wrapping_add(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(value: &str) -> (FieldStore, FieldId) {
        let mut store = FieldStore::new();
        let id = store.register(FieldSpec::default().with_value(value));
        (store, id)
    }

    #[test]
    fn register_allocates_distinct_ids() {
        let mut store = FieldStore::new();
        let a = store.register(FieldSpec::named("a"));
        let b = store.register(FieldSpec::named("b"));
        assert_ne!(a, b);
        assert_eq!(store.name(b), Some("b"));
        assert!(store.has(a));
        assert!(!store.has(FieldId::from_raw(99)));
    }

    #[test]
    fn typing_at_end_appends_and_bumps_revision() {
        let (mut store, id) = store_with("Ban");
        store.insert_text(id, "ana");
        assert_eq!(store.get(id), Some("Banana"));
        assert_eq!(store.caret(id), Some(6));
        assert_eq!(store.value_revision(id), 1);
    }

    #[test]
    fn backspace_removes_whole_multibyte_char() {
        let (mut store, id) = store_with("Crème€");
        store.backspace(id);
        assert_eq!(store.get(id), Some("Crème"));
        store.move_caret_left(id);
        store.move_caret_left(id);
        store.backspace(id);
        assert_eq!(store.get(id), Some("Crme"));
        assert_eq!(store.caret(id), Some(2));
    }

    #[test]
    fn delete_at_end_is_noop() {
        let (mut store, id) = store_with("ab");
        store.delete(id);
        assert_eq!(store.get(id), Some("ab"));
        assert_eq!(store.value_revision(id), 0);

        store.move_caret_to_start(id);
        store.delete(id);
        assert_eq!(store.get(id), Some("b"));
        assert_eq!(store.caret(id), Some(0));
    }

    #[test]
    fn select_all_then_type_replaces_value() {
        let (mut store, id) = store_with("Apple");
        store.select_all(id);
        assert_eq!(store.selection(id), Some(SelectionRange::new(0, 5)));

        store.insert_text(id, "Pear");
        assert_eq!(store.get(id), Some("Pear"));
        assert_eq!(store.selection(id), None);
    }

    #[test]
    fn arrow_keys_collapse_selection_to_its_edges() {
        let (mut store, id) = store_with("Apple");
        store.select_all(id);
        store.move_caret_left(id);
        assert_eq!(store.caret(id), Some(0));

        store.select_all(id);
        store.move_caret_right(id);
        assert_eq!(store.caret(id), Some(5));
        assert_eq!(store.selection(id), None);
    }

    #[test]
    fn set_reports_change_and_strips_newlines() {
        let (mut store, id) = store_with("x");
        assert!(!store.set(id, "x"));
        assert!(store.set(id, "a\nb"));
        assert_eq!(store.get(id), Some("ab"));
        assert_eq!(store.value_revision(id), 1);
    }

    #[test]
    fn disabled_fields_are_left_out_of_form_entries() {
        let mut store = FieldStore::new();
        let visible = store.register(FieldSpec::default().with_value("Banana"));
        let value = store.register(FieldSpec::named("fruit_id").with_value("2"));
        let label = store.register(FieldSpec::named("fruit").with_value("Banana"));

        assert_eq!(store.form_entries(), vec![("fruit_id", "2"), ("fruit", "Banana")]);

        assert!(store.set_disabled(value, true));
        assert!(!store.set_disabled(value, true));
        assert!(store.is_disabled(value));
        assert!(!store.is_disabled(visible));
        assert_eq!(store.form_entries(), vec![("fruit", "Banana")]);
        assert_eq!(store.value(label), "Banana");
    }

    #[test]
    fn edits_on_unknown_ids_are_ignored() {
        let mut store = FieldStore::new();
        let ghost = FieldId::from_raw(7);
        store.insert_text(ghost, "x");
        store.backspace(ghost);
        assert!(!store.set(ghost, "y"));
        assert_eq!(store.value(ghost), "");
    }
}
