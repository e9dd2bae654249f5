use core::fmt;
use core::iter::FusedIterator;
use core::str::FromStr;

use crate::axis::text_serde;
use crate::{A1ParseError, CellRef, CellStore, ColumnRef, RangeError, RowRef};

/// A rectangular, inclusive region within a worksheet.
///
/// The range is always normalized so that `begin` holds the smallest column and row and `end`
/// holds the largest, whatever corners it was built from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RangeRef {
    begin: CellRef,
    end: CellRef,
}

/// Column/row distance between two cells, as applied by [`RangeRef::move_cells`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct CellOffset {
    pub columns: i64,
    pub rows: i64,
}

impl CellOffset {
    pub const fn is_zero(self) -> bool {
        self.columns == 0 && self.rows == 0
    }
}

impl RangeRef {
    /// Build a range from any two corners.
    pub fn new(a: CellRef, b: CellRef) -> Self {
        Self {
            begin: a.lower(b),
            end: a.upper(b),
        }
    }

    /// A range covering exactly one cell.
    pub const fn cell(cell: CellRef) -> Self {
        Self {
            begin: cell,
            end: cell,
        }
    }

    /// Top-left corner.
    #[inline]
    pub const fn begin(&self) -> CellRef {
        self.begin
    }

    /// Bottom-right corner (inclusive).
    #[inline]
    pub const fn end(&self) -> CellRef {
        self.end
    }

    /// Number of columns in the range.
    #[inline]
    pub const fn width(&self) -> u32 {
        self.end.column().value() - self.begin.column().value() + 1
    }

    /// Number of rows in the range.
    #[inline]
    pub const fn height(&self) -> u32 {
        self.end.row().value() - self.begin.row().value() + 1
    }

    /// Number of cells covered.
    #[inline]
    pub const fn cell_count(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    #[inline]
    pub fn is_single_cell(&self) -> bool {
        self.begin == self.end
    }

    /// Returns true if `cell` lies within this range (edges included).
    pub fn contains(&self, cell: CellRef) -> bool {
        self.begin.column() <= cell.column()
            && cell.column() <= self.end.column()
            && self.begin.row() <= cell.row()
            && cell.row() <= self.end.row()
    }

    /// Returns true if every cell of `other` lies within this range.
    pub fn contains_range(&self, other: &RangeRef) -> bool {
        self.contains(other.begin) && self.contains(other.end)
    }

    /// Returns true if the two ranges share at least one cell.
    pub fn intersects(&self, other: &RangeRef) -> bool {
        self.begin.column() <= other.end.column()
            && other.begin.column() <= self.end.column()
            && self.begin.row() <= other.end.row()
            && other.begin.row() <= self.end.row()
    }

    /// Rebuild from two corners, returning `self` when the normalized result is unchanged.
    #[must_use]
    pub fn set_begin_and_end(self, a: CellRef, b: CellRef) -> Self {
        let next = Self::new(a, b);
        if next == self {
            self
        } else {
            next
        }
    }

    #[must_use]
    pub fn set_begin(self, begin: CellRef) -> Self {
        self.set_begin_and_end(begin, self.end)
    }

    #[must_use]
    pub fn set_end(self, end: CellRef) -> Self {
        self.set_begin_and_end(self.begin, end)
    }

    /// Smallest range covering every cell in `cells`.
    pub fn from_cells<I>(cells: I) -> Result<Self, RangeError>
    where
        I: IntoIterator<Item = CellRef>,
    {
        let mut cells = cells.into_iter();
        let first = cells.next().ok_or(RangeError::EmptyCells)?;
        let (begin, end) = cells.fold((first, first), |(begin, end), cell| {
            (begin.lower(cell), end.upper(cell))
        });
        Ok(Self { begin, end })
    }

    /// Every cell in the range, row by row (left to right within a row, rows top to bottom).
    ///
    /// Produced cells take their kinds from `begin`.
    pub fn cells(&self) -> RangeCells {
        RangeCells {
            range: *self,
            next: 0,
            len: self.cell_count(),
        }
    }

    /// Distinct columns spanned, ascending.
    pub fn columns(&self) -> impl Iterator<Item = ColumnRef> + Clone {
        let kind = self.begin.column().kind();
        (self.begin.column().value()..=self.end.column().value())
            .map(move |value| ColumnRef::new_unchecked(value, kind))
    }

    /// Distinct rows spanned, ascending.
    pub fn rows(&self) -> impl Iterator<Item = RowRef> + Clone {
        let kind = self.begin.row().kind();
        (self.begin.row().value()..=self.end.row().value())
            .map(move |value| RowRef::new_unchecked(value, kind))
    }

    /// Column/row delta that carries this range's `begin` onto `target`'s `begin`.
    pub fn offset_to(&self, target: &RangeRef) -> CellOffset {
        CellOffset {
            columns: i64::from(target.begin.column().value())
                - i64::from(self.begin.column().value()),
            rows: i64::from(target.begin.row().value()) - i64::from(self.begin.row().value()),
        }
    }

    /// Delete every entry of `store` whose cell lies within this range.
    ///
    /// Returns the number of deleted entries.
    pub fn clear<V, S>(&self, store: &mut S) -> usize
    where
        S: CellStore<V> + ?Sized,
    {
        let doomed: Vec<CellRef> = store
            .load_all()
            .into_iter()
            .map(|(cell, _)| cell)
            .filter(|cell| self.contains(*cell))
            .collect();
        for cell in &doomed {
            store.delete(cell);
        }
        log::debug!("cleared {} cell(s) in {self}", doomed.len());
        doomed.len()
    }

    /// Re-home the entries contained in this range onto `target`.
    ///
    /// Each entry is translated by [`RangeRef::offset_to`]; entries landing outside `target` are
    /// dropped, so a smaller target truncates the move. `retarget` receives every surviving value
    /// with the applied offset, which is where relative references inside formulas get shifted.
    /// Entries outside this range are ignored.
    pub fn move_cells<V, I, F>(&self, target: RangeRef, entries: I, mut retarget: F) -> Vec<(CellRef, V)>
    where
        I: IntoIterator<Item = (CellRef, V)>,
        F: FnMut(V, CellOffset) -> V,
    {
        let offset = self.offset_to(&target);
        entries
            .into_iter()
            .filter(|(cell, _)| self.contains(*cell))
            .filter_map(|(cell, value)| {
                let moved = cell.add(offset.columns, offset.rows).ok()?;
                target
                    .contains(moved)
                    .then(|| (moved, retarget(value, offset)))
            })
            .collect()
    }

    /// [`RangeRef::move_cells`] against a store: contained entries are deleted and the surviving
    /// translated entries saved. Returns the number of saved entries.
    pub fn move_in<V, S, F>(&self, target: RangeRef, store: &mut S, retarget: F) -> usize
    where
        S: CellStore<V> + ?Sized,
        F: FnMut(V, CellOffset) -> V,
    {
        let contained: Vec<(CellRef, V)> = store
            .load_all()
            .into_iter()
            .filter(|(cell, _)| self.contains(*cell))
            .collect();
        for (cell, _) in &contained {
            store.delete(cell);
        }
        let moved = self.move_cells(target, contained, retarget);
        let saved = moved.len();
        for (cell, value) in moved {
            store.save(cell, value);
        }
        log::debug!("moved {saved} cell(s) from {self} to {target}");
        saved
    }

    /// Parse an A1-style range like `A1:B2` or a single-cell reference like `C3`.
    ///
    /// Corners may be given in any order; the result is normalized.
    pub fn from_a1(a1: &str) -> Result<Self, A1ParseError> {
        let s = a1.trim();
        if s.is_empty() {
            return Err(A1ParseError::Empty);
        }

        match s.split_once(':') {
            None => Ok(Self::cell(CellRef::from_a1(s)?)),
            Some((a, b)) => {
                let start = CellRef::from_a1(a)?;
                let end = CellRef::from_a1(b)?;
                Ok(Self::new(start, end))
            }
        }
    }
}

impl From<CellRef> for RangeRef {
    fn from(cell: CellRef) -> Self {
        Self::cell(cell)
    }
}

impl fmt::Display for RangeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single_cell() {
            write!(f, "{}", self.begin)
        } else {
            write!(f, "{}:{}", self.begin, self.end)
        }
    }
}

impl FromStr for RangeRef {
    type Err = A1ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_a1(s)
    }
}

text_serde!(RangeRef);

/// Row-major iterator over the cells of a [`RangeRef`]. Cloning restarts from the current position.
#[derive(Clone, Debug)]
pub struct RangeCells {
    range: RangeRef,
    next: u64,
    len: u64,
}

impl Iterator for RangeCells {
    type Item = CellRef;

    fn next(&mut self) -> Option<CellRef> {
        if self.next >= self.len {
            return None;
        }
        let width = u64::from(self.range.width());
        let begin = self.range.begin;
        let column = begin.column().value() + (self.next % width) as u32;
        let row = begin.row().value() + (self.next / width) as u32;
        self.next += 1;
        Some(CellRef::new(
            ColumnRef::new_unchecked(column, begin.column().kind()),
            RowRef::new_unchecked(row, begin.row().kind()),
        ))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len - self.next;
        match usize::try_from(remaining) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }
}

impl FusedIterator for RangeCells {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryCellStore;
    use pretty_assertions::assert_eq;

    fn r(a1: &str) -> RangeRef {
        RangeRef::from_a1(a1).unwrap()
    }

    fn c(a1: &str) -> CellRef {
        CellRef::from_a1(a1).unwrap()
    }

    #[test]
    fn corners_are_normalized() {
        assert_eq!(RangeRef::new(c("E5"), c("C3")), r("C3:E5"));
        assert_eq!(RangeRef::new(c("C5"), c("E3")), r("C3:E5"));
        assert_eq!(r("E3:C5").to_string(), "C3:E5");
        assert_eq!(r("C3:E5").width(), 3);
        assert_eq!(r("C3:E5").height(), 3);
        assert_eq!(r("C3:E5").cell_count(), 9);
    }

    #[test]
    fn single_cell_text() {
        let single = r("C3");
        assert!(single.is_single_cell());
        assert_eq!(single.to_string(), "C3");
        assert_eq!(r("C3:C3").to_string(), "C3");
        assert_eq!(r("$A$1:B2").to_string(), "$A$1:B2");
    }

    #[test]
    fn contains_includes_edges() {
        let range = r("C3:E5");
        for inside in ["C3", "E5", "D4", "E3", "C5"] {
            assert!(range.contains(c(inside)), "{inside} should be inside");
        }
        for outside in ["B2", "F6", "D2", "D6", "B4", "F4"] {
            assert!(!range.contains(c(outside)), "{outside} should be outside");
        }
    }

    #[test]
    fn range_relations() {
        assert!(r("A1:D4").contains_range(&r("B2:C3")));
        assert!(!r("B2:C3").contains_range(&r("A1:D4")));
        assert!(r("A1:B2").intersects(&r("B2:C3")));
        assert!(!r("A1:B2").intersects(&r("C3:D4")));
    }

    #[test]
    fn cells_are_row_major_and_restartable() {
        let range = r("C3:D4");
        let cells: Vec<String> = range.cells().map(|cell| cell.to_string()).collect();
        assert_eq!(cells, vec!["C3", "D3", "C4", "D4"]);

        let iter = range.cells();
        assert_eq!(iter.size_hint(), (4, Some(4)));
        assert_eq!(iter.clone().count(), 4);
        assert_eq!(iter.count(), 4);
    }

    #[test]
    fn columns_and_rows_are_ascending() {
        let range = r("B7:D9");
        let columns: Vec<String> = range.columns().map(|col| col.to_string()).collect();
        let rows: Vec<String> = range.rows().map(|row| row.to_string()).collect();
        assert_eq!(columns, vec!["B", "C", "D"]);
        assert_eq!(rows, vec!["7", "8", "9"]);
    }

    #[test]
    fn set_begin_and_end_keeps_self_when_unchanged() {
        let range = r("$B$2:D4");
        let same = range.set_begin_and_end(c("D4"), c("B2"));
        // Relative corners would render without `$` had a fresh range been built.
        assert_eq!(same.to_string(), "$B$2:D4");

        let grown = range.set_end(c("E5"));
        assert_eq!(grown, r("B2:E5"));
    }

    #[test]
    fn from_cells_computes_bounds() {
        let bounds = RangeRef::from_cells([c("C9"), c("A4"), c("B12")]).unwrap();
        assert_eq!(bounds, r("A4:C12"));
        assert_eq!(
            RangeRef::from_cells(Vec::new()),
            Err(RangeError::EmptyCells)
        );
    }

    #[test]
    fn clear_only_touches_contained_cells() {
        let mut store = MemoryCellStore::default();
        for a1 in ["A1", "B2", "C3", "D4"] {
            store.save(c(a1), a1.to_string());
        }
        let range = r("B2:C3");
        assert_eq!(range.clear(&mut store), 2);
        let left: Vec<CellRef> = store.iter().map(|(cell, _)| *cell).collect();
        assert_eq!(left, vec![c("A1"), c("D4")]);
        assert_eq!(range, r("B2:C3"));
    }

    #[test]
    fn move_translates_and_drops_outside_target() {
        let source = r("A1:B2");
        let target = r("C3:C4");
        let entries = vec![
            (c("A1"), "a1"),
            (c("B1"), "b1"),
            (c("A2"), "a2"),
            (c("B2"), "b2"),
            (c("Z9"), "outside"),
        ];
        let mut offsets = Vec::new();
        let moved = source.move_cells(target, entries, |value, offset| {
            offsets.push(offset);
            value
        });
        assert_eq!(moved, vec![(c("C3"), "a1"), (c("C4"), "a2")]);
        assert_eq!(
            offsets,
            vec![CellOffset { columns: 2, rows: 2 }; 2]
        );
    }

    #[test]
    fn move_in_rewrites_the_store() {
        let mut store = MemoryCellStore::default();
        store.save(c("A1"), 1);
        store.save(c("A2"), 2);
        store.save(c("F6"), 6);

        let saved = r("A1:A2").move_in(r("B1:B2"), &mut store, |value, _| value * 10);
        assert_eq!(saved, 2);
        let cells: Vec<(CellRef, i32)> = store.iter().map(|(cell, v)| (*cell, *v)).collect();
        assert_eq!(cells, vec![(c("B1"), 10), (c("B2"), 20), (c("F6"), 6)]);
    }
}
