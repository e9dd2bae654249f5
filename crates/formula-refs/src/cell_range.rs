use std::collections::BTreeMap;

use crate::{CellRef, RangeError, RangeRef};

/// Cells keyed by reference, all guaranteed to lie within a declared range.
///
/// Used as the input and output shape of range-wide operations such as sorting, where the range
/// bounds matter even when some of its cells are empty.
#[derive(Clone, Debug, PartialEq)]
pub struct CellRange<V> {
    range: RangeRef,
    cells: BTreeMap<CellRef, V>,
}

impl<V> CellRange<V> {
    /// Fails with [`RangeError::CellsOutsideRange`] listing every cell outside `range`.
    pub fn new<I>(range: RangeRef, cells: I) -> Result<Self, RangeError>
    where
        I: IntoIterator<Item = (CellRef, V)>,
    {
        let cells: BTreeMap<CellRef, V> = cells.into_iter().collect();
        let outside: Vec<CellRef> = cells
            .keys()
            .copied()
            .filter(|cell| !range.contains(*cell))
            .collect();
        if !outside.is_empty() {
            return Err(RangeError::CellsOutsideRange {
                range,
                cells: outside,
            });
        }
        Ok(Self { range, cells })
    }

    pub fn empty(range: RangeRef) -> Self {
        Self {
            range,
            cells: BTreeMap::new(),
        }
    }

    pub fn range(&self) -> RangeRef {
        self.range
    }

    pub fn cells(&self) -> &BTreeMap<CellRef, V> {
        &self.cells
    }

    pub fn get(&self, cell: &CellRef) -> Option<&V> {
        self.cells.get(cell)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn into_parts(self) -> (RangeRef, BTreeMap<CellRef, V>) {
        (self.range, self.cells)
    }
}
