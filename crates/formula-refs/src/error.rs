use thiserror::Error;

use crate::{CellRef, RangeRef};

/// Errors that can occur when parsing an A1-style column, row, cell or range reference.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum A1ParseError {
    #[error("empty A1 reference")]
    Empty,
    #[error("missing column in A1 reference")]
    MissingColumn,
    #[error("missing row in A1 reference")]
    MissingRow,
    #[error("invalid column in A1 reference")]
    InvalidColumn,
    #[error("invalid row in A1 reference")]
    InvalidRow,
    #[error("column in A1 reference exceeds the worksheet limit")]
    ColumnOutOfBounds,
    #[error("row in A1 reference exceeds the worksheet limit")]
    RowOutOfBounds,
    #[error("trailing characters in A1 reference")]
    TrailingCharacters,
}

/// Errors raised by column/row/cell arithmetic and checked constructors.
///
/// The offending value is reported 0-based, as it would have been stored.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum ReferenceError {
    #[error("column {value} exceeds the maximum column {max}", max = crate::MAX_COLUMN)]
    ColumnOverflow { value: i64 },
    #[error("row {value} exceeds the maximum row {max}", max = crate::MAX_ROW)]
    RowOverflow { value: i64 },
    #[error("column {value} is negative")]
    NegativeColumn { value: i64 },
    #[error("row {value} is negative")]
    NegativeRow { value: i64 },
}

/// Errors raised while building ranges and range-keyed cell collections.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("cannot compute the bounds of an empty cell collection")]
    EmptyCells,
    #[error(transparent)]
    Parse(#[from] A1ParseError),
    #[error("{} outside range {range}", list_cells(.cells))]
    CellsOutsideRange { range: RangeRef, cells: Vec<CellRef> },
}

fn list_cells(cells: &[CellRef]) -> String {
    let rendered: Vec<String> = cells.iter().map(CellRef::to_a1).collect();
    match rendered.len() {
        1 => format!("cell {}", rendered[0]),
        _ => format!("cells {}", rendered.join(", ")),
    }
}
