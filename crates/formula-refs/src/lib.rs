//! `formula-refs` defines the reference value types shared by the range engine:
//! columns, rows, cells, rectangular ranges and labels.
//!
//! All types are immutable values. Edits return a new value, or the receiver itself when the
//! edit would not change anything. Text forms use A1 notation and double as the `serde`
//! representation, so references stay readable in JSON payloads.

mod address;
mod axis;
mod cell_range;
mod error;
mod expression;
mod names;
mod range;
pub mod store;

pub use address::CellRef;
pub use axis::{
    column_to_letters, letters_to_column, ColumnRef, ReferenceKind, RowRef, EXCEL_MAX_COLS,
    EXCEL_MAX_ROWS, MAX_COLUMN, MAX_ROW,
};
pub use cell_range::CellRange;
pub use error::{A1ParseError, RangeError, ReferenceError};
pub use expression::{ExpressionParseError, ExpressionRef};
pub use names::{validate_label_name, LabelMapping, LabelName, LabelNameError, LABEL_MAX_LEN};
pub use range::{CellOffset, RangeCells, RangeRef};
pub use store::{
    CellStore, LabelStore, MemoryCellStore, MemoryLabelStore, MemoryRangeStore, RangeToCellStore,
};
