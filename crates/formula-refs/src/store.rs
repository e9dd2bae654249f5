//! Collaborator traits through which references reach host storage, plus in-memory
//! implementations.
//!
//! Stores are passed explicitly to the code that needs them; nothing here is global.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::{CellRef, ExpressionRef, LabelMapping, LabelName, RangeRef};

/// Looks up the mapping registered for a label.
pub trait LabelStore {
    fn load(&self, label: &LabelName) -> Option<LabelMapping>;
}

/// Cells previously materialized for a range (e.g. the cells a formula over `A:A` actually
/// touched).
pub trait RangeToCellStore {
    fn find_values(&self, range: &RangeRef) -> BTreeSet<CellRef>;
}

/// A keyed cell container that range operations can rewrite.
pub trait CellStore<V> {
    /// Every stored entry, ordered by cell.
    fn load_all(&self) -> Vec<(CellRef, V)>;

    fn delete(&mut self, cell: &CellRef) -> Option<V>;

    fn save(&mut self, cell: CellRef, value: V);
}

impl<T: LabelStore + ?Sized> LabelStore for &T {
    fn load(&self, label: &LabelName) -> Option<LabelMapping> {
        (**self).load(label)
    }
}

impl<T: RangeToCellStore + ?Sized> RangeToCellStore for &T {
    fn find_values(&self, range: &RangeRef) -> BTreeSet<CellRef> {
        (**self).find_values(range)
    }
}

#[derive(Clone, Debug, Default)]
pub struct MemoryLabelStore {
    labels: HashMap<LabelName, LabelMapping>,
}

impl MemoryLabelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `mapping`, replacing any mapping for a label that compares equal.
    pub fn insert(&mut self, mapping: LabelMapping) -> Option<LabelMapping> {
        self.labels.insert(mapping.label().clone(), mapping)
    }

    /// Convenience for `insert(LabelMapping::new(label, reference))`.
    pub fn define(
        &mut self,
        label: LabelName,
        reference: impl Into<ExpressionRef>,
    ) -> Option<LabelMapping> {
        self.insert(LabelMapping::new(label, reference))
    }

    pub fn remove(&mut self, label: &LabelName) -> Option<LabelMapping> {
        self.labels.remove(label)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl LabelStore for MemoryLabelStore {
    fn load(&self, label: &LabelName) -> Option<LabelMapping> {
        self.labels.get(label).cloned()
    }
}

impl FromIterator<LabelMapping> for MemoryLabelStore {
    fn from_iter<I: IntoIterator<Item = LabelMapping>>(iter: I) -> Self {
        let mut store = Self::default();
        for mapping in iter {
            store.insert(mapping);
        }
        store
    }
}

#[derive(Clone, Debug, Default)]
pub struct MemoryRangeStore {
    ranges: HashMap<RangeRef, BTreeSet<CellRef>>,
}

impl MemoryRangeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `cell` was materialized for `range`.
    pub fn record(&mut self, range: RangeRef, cell: CellRef) {
        self.ranges.entry(range).or_default().insert(cell);
    }

    pub fn forget(&mut self, range: &RangeRef) -> Option<BTreeSet<CellRef>> {
        self.ranges.remove(range)
    }
}

impl RangeToCellStore for MemoryRangeStore {
    fn find_values(&self, range: &RangeRef) -> BTreeSet<CellRef> {
        self.ranges.get(range).cloned().unwrap_or_default()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MemoryCellStore<V> {
    cells: BTreeMap<CellRef, V>,
}

impl<V> Default for MemoryCellStore<V> {
    fn default() -> Self {
        Self {
            cells: BTreeMap::new(),
        }
    }
}

impl<V> MemoryCellStore<V> {
    pub fn get(&self, cell: &CellRef) -> Option<&V> {
        self.cells.get(cell)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CellRef, &V)> {
        self.cells.iter()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<V: Clone> CellStore<V> for MemoryCellStore<V> {
    fn load_all(&self) -> Vec<(CellRef, V)> {
        self.cells
            .iter()
            .map(|(cell, value)| (*cell, value.clone()))
            .collect()
    }

    fn delete(&mut self, cell: &CellRef) -> Option<V> {
        self.cells.remove(cell)
    }

    fn save(&mut self, cell: CellRef, value: V) {
        self.cells.insert(cell, value);
    }
}

impl<V> FromIterator<(CellRef, V)> for MemoryCellStore<V> {
    fn from_iter<I: IntoIterator<Item = (CellRef, V)>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}
