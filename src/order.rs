//! Major-order markers.
//!
//! A fast matrix stores its data as a run of major vectors: columns for
//! [`ColumnMajor`], rows for [`RowMajor`]. The marker is a type parameter, so
//! flipping it ([`MajorOrder::Flipped`]) reinterprets the same registers as
//! the transposed matrix at no cost.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ColumnMajor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RowMajor;

/// Order marker of fast vectors. Vectors have a single major, and matrices
/// are never operand sources for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Linear;

/// Runtime tag of a major order, used in descriptors and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderKind {
    ColumnMajor,
    RowMajor,
}

pub trait MajorOrder: Copy + Default + Send + Sync + 'static {
    const KIND: OrderKind;
    const IS_COLUMN_MAJOR: bool;

    type Flipped: MajorOrder<Flipped = Self>;
}

impl MajorOrder for ColumnMajor {
    const KIND: OrderKind = OrderKind::ColumnMajor;
    const IS_COLUMN_MAJOR: bool = true;

    type Flipped = RowMajor;
}

impl MajorOrder for RowMajor {
    const KIND: OrderKind = OrderKind::RowMajor;
    const IS_COLUMN_MAJOR: bool = false;

    type Flipped = ColumnMajor;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flip_twice<O: MajorOrder>() -> bool {
        <<O::Flipped as MajorOrder>::Flipped as MajorOrder>::IS_COLUMN_MAJOR == O::IS_COLUMN_MAJOR
    }

    #[test]
    fn flipping_is_an_involution() {
        assert!(flip_twice::<ColumnMajor>());
        assert!(flip_twice::<RowMajor>());
        assert!(!<<ColumnMajor as MajorOrder>::Flipped as MajorOrder>::IS_COLUMN_MAJOR);
    }

    #[test]
    fn kinds_serialize_in_snake_case() {
        assert_eq!(
            serde_json::to_string(&OrderKind::ColumnMajor).unwrap(),
            "\"column_major\""
        );
        assert_eq!(
            serde_json::to_string(&RowMajor::KIND).unwrap(),
            "\"row_major\""
        );
    }
}
