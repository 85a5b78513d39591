//! Identifier for fields held by a [`FieldStore`](crate::FieldStore).

/// Opaque, copyable handle for one field.
///
/// Ids are allocated by [`FieldStore::register`](crate::FieldStore::register)
/// and are only meaningful for the store that issued them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(u64);

impl FieldId {
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn as_raw(self) -> u64 {
        self.0
    }
}

impl From<u64> for FieldId {
    #[inline]
    fn from(raw: u64) -> Self {
        Self::from_raw(raw)
    }
}

impl From<FieldId> for u64 {
    #[inline]
    fn from(id: FieldId) -> Self {
        id.as_raw()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_ids_compare_by_raw_value() {
        assert_eq!(FieldId::from_raw(3), FieldId::from(3u64));
        assert!(FieldId::from_raw(1) < FieldId::from_raw(2));
        assert_eq!(u64::from(FieldId::from_raw(9)), 9);
    }
}
