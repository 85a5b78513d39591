//! Lenient HTML fragment parsing.
//!
//! Typeahead endpoints answer with rendered result rows, and controllers are
//! mounted on elements described by markup. Both only need a forgiving
//! fragment parser: tags, attributes, text and comments, with a minimal entity
//! set. Malformed input never fails; stray end tags are dropped and unclosed
//! elements are closed at the end of input.

mod entities;
mod tokenizer;
mod tree;
mod types;

pub use entities::decode_entities;
pub use tokenizer::tokenize;
pub use tree::parse_fragment;
pub use types::{Descendants, Node, Token};
