//! Range-level operations built on the reference types from `formula-refs`:
//! label resolution, windowed cell deltas and multi-key range sorting.
//!
//! Stores and comparison semantics are injected by the caller; this crate performs no I/O and
//! keeps no global state.

mod delta;
mod resolve;
mod settings;
pub mod sort;

pub use delta::{window_filter, Cell, CellValue, Delta, SpreadsheetId};
pub use resolve::ReferenceResolver;
pub use settings::ResolverSettings;
pub use sort::{
    sort_cell_range, AxisRef, CellBuffer, CellBufferError, CellMove, DefaultSortContext,
    RangeComparator, SortContext, SortDirection, SortError, SortKey, SortOrientation, SortedCells,
    ValueComparator,
};
