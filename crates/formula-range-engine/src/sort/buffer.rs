use thiserror::Error;

use super::AxisRef;
use crate::Cell;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CellBufferError {
    #[error("index {index} is out of bounds for a buffer of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },
}

/// One row's (or column's) worth of cells across a sorted selection.
///
/// The length is fixed at construction; slots may only be read and replaced.
#[derive(Debug, Clone, PartialEq)]
pub struct CellBuffer {
    axis: AxisRef,
    slots: Box<[Option<Cell>]>,
}

impl CellBuffer {
    /// An all-empty buffer of `len` slots.
    pub fn new(axis: AxisRef, len: usize) -> Self {
        Self {
            axis,
            slots: (0..len).map(|_| None).collect(),
        }
    }

    /// The row or column this buffer was staged from.
    pub fn axis(&self) -> AxisRef {
        self.axis
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The cell at `index`; `None` for an empty slot or an index past the end.
    pub fn get(&self, index: usize) -> Option<&Cell> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Replace the slot at `index`, returning its previous content.
    pub fn set(&mut self, index: usize, cell: Option<Cell>) -> Result<Option<Cell>, CellBufferError> {
        let len = self.slots.len();
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(CellBufferError::IndexOutOfBounds { index, len })?;
        Ok(std::mem::replace(slot, cell))
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&Cell>> + '_ {
        self.slots.iter().map(Option::as_ref)
    }

    pub(crate) fn into_slots(self) -> Vec<Option<Cell>> {
        self.slots.into_vec()
    }
}
