//! Text selection representation.

/// A normalized byte range (`start <= end`) into a field value.
///
/// Offsets produced by [`FieldStore`](crate::FieldStore) always sit on UTF-8
/// character boundaries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SelectionRange {
    pub start: usize,
    pub end: usize,
}

impl SelectionRange {
    #[inline]
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns the selected part of `value`, or `""` if the range does not fit.
    pub fn slice<'a>(&self, value: &'a str) -> &'a str {
        value.get(self.start..self.end).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_orders_endpoints() {
        let range = SelectionRange::new(7, 2);
        assert_eq!((range.start, range.end), (2, 7));
        assert_eq!(range.len(), 5);
        assert!(!range.is_empty());
    }

    #[test]
    fn slice_tolerates_out_of_range_offsets() {
        assert_eq!(SelectionRange::new(0, 3).slice("Apple"), "App");
        assert_eq!(SelectionRange::new(2, 40).slice("Apple"), "");
    }
}
