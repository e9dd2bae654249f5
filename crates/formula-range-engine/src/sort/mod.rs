//! Multi-key sorting of rectangular cell selections.
//!
//! A selection is staged as one [`CellBuffer`] per row (or per column), the buffers are ordered
//! with a [`RangeComparator`], and the result is flattened back into cells at their new
//! positions.

mod buffer;
mod comparator;
mod engine;

use core::cmp::Ordering;
use core::fmt;

use formula_refs::{column_to_letters, CellRef, ColumnRef, RangeError, RangeRef, ReferenceError, RowRef};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use buffer::{CellBuffer, CellBufferError};
pub use comparator::{DefaultSortContext, RangeComparator, SortContext};
pub use engine::{sort_cell_range, CellMove, SortedCells};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    /// Apply the direction to an ascending comparison result.
    pub fn apply(self, ord: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    }
}

/// How two evaluated values are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueComparator {
    /// Excel's mixed-type order: numbers and dates, then text, then booleans, then errors.
    #[default]
    Value,
    /// Compare display text, honoring the context's case sensitivity.
    Text,
    /// Compare display text, always ignoring case.
    TextCaseInsensitive,
    /// Compare numerically; non-numeric values rank above all numbers.
    Number,
    /// Compare date-times; other values rank above all date-times.
    DateTime,
    /// Compare booleans (`FALSE < TRUE`); other values rank above all booleans.
    Bool,
}

/// The column or row a sort key (or a staged buffer) is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AxisRef {
    Column(ColumnRef),
    Row(RowRef),
}

impl fmt::Display for AxisRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AxisRef::Column(column) => write!(f, "column {}", column_to_letters(column.value())),
            AxisRef::Row(row) => write!(f, "row {}", row.value() + 1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortKey {
    pub axis: AxisRef,
    #[serde(default)]
    pub comparator: ValueComparator,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortKey {
    pub fn new(axis: AxisRef, comparator: ValueComparator, direction: SortDirection) -> Self {
        Self {
            axis,
            comparator,
            direction,
        }
    }

    /// Ascending [`ValueComparator::Value`] key on `column`.
    pub fn column(column: ColumnRef) -> Self {
        Self::new(
            AxisRef::Column(column),
            ValueComparator::Value,
            SortDirection::Ascending,
        )
    }

    /// Ascending [`ValueComparator::Value`] key on `row`.
    pub fn row(row: RowRef) -> Self {
        Self::new(
            AxisRef::Row(row),
            ValueComparator::Value,
            SortDirection::Ascending,
        )
    }

    #[must_use]
    pub fn with_comparator(self, comparator: ValueComparator) -> Self {
        Self { comparator, ..self }
    }

    #[must_use]
    pub fn descending(self) -> Self {
        Self {
            direction: SortDirection::Descending,
            ..self
        }
    }
}

/// What moves when a selection is sorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortOrientation {
    /// Whole rows move; keys name columns.
    Rows,
    /// Whole columns move; keys name rows.
    Columns,
}

impl fmt::Display for SortOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortOrientation::Rows => "rows",
            SortOrientation::Columns => "columns",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SortError {
    #[error("at least one sort key is required")]
    EmptyKeys,
    #[error("cannot sort {orientation} by {key}")]
    KeyAxisMismatch {
        key: AxisRef,
        orientation: SortOrientation,
    },
    #[error("sort key {key} lies outside range {range}")]
    KeyOutsideRange { key: AxisRef, range: RangeRef },
    #[error(transparent)]
    Buffer(#[from] CellBufferError),
    #[error(transparent)]
    Reference(#[from] ReferenceError),
    #[error(transparent)]
    Range(#[from] RangeError),
}

/// Position of `cell` along `axis`'s direction, relative to `origin`.
///
/// Column keys index by column, row keys by row. `None` when `cell` precedes `origin`.
fn axis_offset(axis: AxisRef, origin: CellRef) -> Option<usize> {
    let (value, start) = match axis {
        AxisRef::Column(column) => (column.value(), origin.column().value()),
        AxisRef::Row(row) => (row.value(), origin.row().value()),
    };
    value
        .checked_sub(start)
        .and_then(|offset| usize::try_from(offset).ok())
}
