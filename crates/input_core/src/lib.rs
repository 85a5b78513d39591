//! # input_core
//!
//! UI-agnostic form field state for typeahead controls and the forms that
//! host them.
//!
//! - [`FieldId`]: opaque identifier for a field inside a [`FieldStore`]
//! - [`FieldStore`]: values, caret positions, selections, `disabled` flags and
//!   form names for a set of fields
//! - [`SelectionRange`]: a text selection with start/end byte offsets
//!
//! ## Design Principles
//!
//! The store knows nothing about rendering, popups or network queries. A
//! control owns one store for its own fields (visible text, hidden value,
//! hidden label, clear button) and the surrounding form reads submitted values
//! back through [`FieldStore::form_entries`], the same way it would read native
//! fields.

mod id;
mod selection;
mod state;
mod store;
mod text;

pub use id::FieldId;
pub use selection::SelectionRange;
pub use store::{FieldSpec, FieldStore};

pub use text::{clamp_to_char_boundary, filter_single_line, next_cursor_boundary, prev_cursor_boundary};
