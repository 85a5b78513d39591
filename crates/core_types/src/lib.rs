pub type ControlId = u64;
pub type RequestId = u64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceKind {
    /// Rendered result rows for a typeahead query.
    QueryRows,
}
