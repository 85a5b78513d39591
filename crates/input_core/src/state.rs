//! Per-field state stored inside [`FieldStore`](crate::FieldStore).

#[derive(Clone, Debug, Default)]
pub(crate) struct FieldState {
    /// Form name used when the surrounding form serializes its fields.
    pub name: Option<String>,

    pub value: String,

    /// Monotonic revision counter, incremented whenever `value` changes.
    pub value_rev: u64,

    /// Disabled fields are skipped by form serialization and refuse edits.
    pub disabled: bool,

    /// Caret position as a byte index into `value` (always on a char boundary).
    pub caret: usize,

    /// When `Some(anchor)`, the selection is `min(anchor, caret)..max(anchor, caret)`.
    pub selection_anchor: Option<usize>,
}
