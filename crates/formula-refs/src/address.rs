use core::fmt;
use core::str::FromStr;

use crate::axis::text_serde;
use crate::{A1ParseError, ColumnRef, ReferenceError, ReferenceKind, RowRef};

/// A reference to a single cell within a worksheet.
///
/// Columns and rows are **0-indexed** (`column = 0` is `A`, `row = 0` is row `1`). Each axis
/// carries its own [`ReferenceKind`], which only affects rendering.
///
/// Cells are ordered **column-major**: by column value first, then by row value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellRef {
    column: ColumnRef,
    row: RowRef,
}

impl CellRef {
    #[inline]
    pub const fn new(column: ColumnRef, row: RowRef) -> Self {
        Self { column, row }
    }

    /// Construct a relative cell from 0-indexed coordinates.
    pub fn at(column: u32, row: u32) -> Result<Self, ReferenceError> {
        Ok(Self {
            column: ColumnRef::relative(column)?,
            row: RowRef::relative(row)?,
        })
    }

    #[inline]
    pub const fn column(self) -> ColumnRef {
        self.column
    }

    #[inline]
    pub const fn row(self) -> RowRef {
        self.row
    }

    /// Replace the column. Passing an equal column returns `self` untouched, kind included.
    #[must_use]
    pub fn set_column(self, column: ColumnRef) -> Self {
        if column == self.column {
            return self;
        }
        Self { column, ..self }
    }

    /// Replace the row. Passing an equal row returns `self` untouched, kind included.
    #[must_use]
    pub fn set_row(self, row: RowRef) -> Self {
        if row == self.row {
            return self;
        }
        Self { row, ..self }
    }

    pub fn add(self, columns: i64, rows: i64) -> Result<Self, ReferenceError> {
        Ok(Self {
            column: self.column.add(columns)?,
            row: self.row.add(rows)?,
        })
    }

    pub fn add_column(self, delta: i64) -> Result<Self, ReferenceError> {
        self.add(delta, 0)
    }

    pub fn add_row(self, delta: i64) -> Result<Self, ReferenceError> {
        self.add(0, delta)
    }

    /// Component-wise minimum: the smaller column and the smaller row, picked independently.
    ///
    /// On ties the receiver's coordinate (and therefore its kind) is kept.
    #[must_use]
    pub fn lower(self, other: CellRef) -> Self {
        Self {
            column: if other.column < self.column {
                other.column
            } else {
                self.column
            },
            row: if other.row < self.row { other.row } else { self.row },
        }
    }

    /// Component-wise maximum: the larger column and the larger row, picked independently.
    #[must_use]
    pub fn upper(self, other: CellRef) -> Self {
        Self {
            column: if other.column > self.column {
                other.column
            } else {
                self.column
            },
            row: if other.row > self.row { other.row } else { self.row },
        }
    }

    #[must_use]
    pub const fn set_kind(self, kind: ReferenceKind) -> Self {
        Self {
            column: self.column.set_kind(kind),
            row: self.row.set_kind(kind),
        }
    }

    #[must_use]
    pub const fn to_absolute(self) -> Self {
        self.set_kind(ReferenceKind::Absolute)
    }

    #[must_use]
    pub const fn to_relative(self) -> Self {
        self.set_kind(ReferenceKind::Relative)
    }

    /// Convert to A1 notation (e.g. `B9`, `$B$9`).
    pub fn to_a1(&self) -> String {
        self.to_string()
    }

    /// Parse an A1-style reference (e.g. `A1`, `$B$2`, `b$7`).
    pub fn from_a1(a1: &str) -> Result<Self, A1ParseError> {
        let s = a1.trim();
        if s.is_empty() {
            return Err(A1ParseError::Empty);
        }

        // The column part is an optional `$` followed by letters; everything after is the row.
        let bytes = s.as_bytes();
        let mut split = usize::from(bytes[0] == b'$');
        while split < bytes.len() && bytes[split].is_ascii_alphabetic() {
            split += 1;
        }

        let (column, row) = s.split_at(split);
        if column.trim_start_matches('$').is_empty() {
            return Err(A1ParseError::MissingColumn);
        }
        if row.is_empty() {
            return Err(A1ParseError::MissingRow);
        }

        Ok(Self {
            column: ColumnRef::parse(column)?,
            row: RowRef::parse(row)?,
        })
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.column, self.row)
    }
}

impl FromStr for CellRef {
    type Err = A1ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_a1(s)
    }
}

text_serde!(CellRef);
