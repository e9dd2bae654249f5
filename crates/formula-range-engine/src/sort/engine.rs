use std::collections::BTreeMap;

use formula_refs::{CellRange, CellRef, RangeRef};
use serde::{Deserialize, Serialize};

use super::{
    AxisRef, CellBuffer, RangeComparator, SortContext, SortError, SortKey, SortOrientation,
};
use crate::Cell;

/// A cell that changed position during a sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellMove {
    pub from: CellRef,
    pub to: CellRef,
}

impl CellMove {
    /// Column and row delta, for retargeting relative references in the moved formula.
    pub fn offset(&self) -> (i64, i64) {
        (
            i64::from(self.to.column().value()) - i64::from(self.from.column().value()),
            i64::from(self.to.row().value()) - i64::from(self.from.row().value()),
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortedCells {
    /// The sorted selection, same range as the input.
    pub cells: CellRange<Cell>,
    /// Every cell whose position changed, in output order.
    pub moves: Vec<CellMove>,
}

/// Sort a rectangular selection by `keys`, moving whole rows or whole columns.
///
/// Row sorts take column keys and column sorts take row keys; every key must lie within the
/// selection. The sort is stable: lines that tie on every key keep their relative order.
pub fn sort_cell_range<C>(
    cells: CellRange<Cell>,
    orientation: SortOrientation,
    keys: &[SortKey],
    ctx: &C,
) -> Result<SortedCells, SortError>
where
    C: SortContext + ?Sized,
{
    let range = cells.range();
    for key in keys {
        check_key(key.axis, orientation, range)?;
    }
    let comparator = RangeComparator::new(range.begin(), keys.to_vec(), ctx)?;

    let mut lines = stage(cells, orientation)?;
    log::trace!(
        "sorting {} occupied {orientation} of {range} by {} key(s)",
        lines.iter().filter(|line| matches!(line, Line::Occupied(_))).count(),
        keys.len()
    );
    // Gaps hold no cells, so every key reads as missing for them.
    let blank = CellBuffer::new(AxisRef::Row(range.begin().row()), 0);
    lines.sort_by(|a, b| comparator.compare(a.buffer(&blank), b.buffer(&blank)));

    let mut sorted = BTreeMap::new();
    let mut moves = Vec::new();
    let mut target = 0usize;
    for line in lines {
        let buffer = match line {
            Line::Gap(len) => {
                target += len;
                continue;
            }
            Line::Occupied(buffer) => buffer,
        };
        let source = line_index(buffer.axis(), range);
        let shift = target as i64 - source as i64;
        target += 1;
        for cell in buffer.into_slots().into_iter().flatten() {
            let from = cell.reference();
            let to = match orientation {
                SortOrientation::Rows => from.add_row(shift)?,
                SortOrientation::Columns => from.add_column(shift)?,
            };
            if shift != 0 {
                moves.push(CellMove { from, to });
            }
            sorted.insert(to, cell.set_reference(to));
        }
    }

    Ok(SortedCells {
        cells: CellRange::new(range, sorted)?,
        moves,
    })
}

/// A staged row (or column) of the selection, or a run of consecutive lines holding no cells.
enum Line {
    Occupied(CellBuffer),
    Gap(usize),
}

impl Line {
    fn buffer<'a>(&'a self, blank: &'a CellBuffer) -> &'a CellBuffer {
        match self {
            Line::Occupied(buffer) => buffer,
            Line::Gap(_) => blank,
        }
    }
}

fn check_key(key: AxisRef, orientation: SortOrientation, range: RangeRef) -> Result<(), SortError> {
    let within = match (orientation, key) {
        (SortOrientation::Rows, AxisRef::Column(column)) => {
            range.begin().column() <= column && column <= range.end().column()
        }
        (SortOrientation::Columns, AxisRef::Row(row)) => {
            range.begin().row() <= row && row <= range.end().row()
        }
        _ => return Err(SortError::KeyAxisMismatch { key, orientation }),
    };
    if !within {
        return Err(SortError::KeyOutsideRange { key, range });
    }
    Ok(())
}

/// Offset of a staged line from the start of `range`.
fn line_index(axis: AxisRef, range: RangeRef) -> usize {
    let (value, start) = match axis {
        AxisRef::Column(column) => (column.value(), range.begin().column().value()),
        AxisRef::Row(row) => (row.value(), range.begin().row().value()),
    };
    (value - start) as usize
}

/// Stage the occupied lines in selection order, with runs of empty lines collapsed into gaps.
///
/// Each buffer is indexed from the range's begin and only reaches its last occupied slot, so
/// staging costs follow the number of cells rather than the size of the selection.
fn stage(cells: CellRange<Cell>, orientation: SortOrientation) -> Result<Vec<Line>, SortError> {
    let (range, cells) = cells.into_parts();
    let begin = range.begin();
    let line_count = match orientation {
        SortOrientation::Rows => range.height(),
        SortOrientation::Columns => range.width(),
    } as usize;

    let mut occupied: BTreeMap<usize, Vec<(usize, Cell)>> = BTreeMap::new();
    for (reference, cell) in cells {
        let column = (reference.column().value() - begin.column().value()) as usize;
        let row = (reference.row().value() - begin.row().value()) as usize;
        let (line, slot) = match orientation {
            SortOrientation::Rows => (row, column),
            SortOrientation::Columns => (column, row),
        };
        // Keyed by reference, so the cell always agrees with its slot.
        occupied
            .entry(line)
            .or_default()
            .push((slot, cell.set_reference(reference)));
    }

    let mut lines = Vec::with_capacity(occupied.len() * 2 + 1);
    let mut next = 0usize;
    for (index, slots) in occupied {
        if index > next {
            lines.push(Line::Gap(index - next));
        }
        let Some(reference) = slots.first().map(|(_, cell)| cell.reference()) else {
            continue;
        };
        let axis = match orientation {
            SortOrientation::Rows => AxisRef::Row(reference.row()),
            SortOrientation::Columns => AxisRef::Column(reference.column()),
        };
        let len = slots.iter().map(|(slot, _)| slot + 1).max().unwrap_or(0);
        let mut buffer = CellBuffer::new(axis, len);
        for (slot, cell) in slots {
            buffer.set(slot, Some(cell))?;
        }
        lines.push(Line::Occupied(buffer));
        next = index + 1;
    }
    if line_count > next {
        lines.push(Line::Gap(line_count - next));
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sort::{DefaultSortContext, ValueComparator};
    use crate::CellValue;
    use formula_refs::{ColumnRef, RowRef};
    use pretty_assertions::assert_eq;

    fn c(a1: &str) -> CellRef {
        CellRef::from_a1(a1).unwrap()
    }

    fn r(a1: &str) -> RangeRef {
        RangeRef::from_a1(a1).unwrap()
    }

    fn text(a1: &str, value: &str) -> (CellRef, Cell) {
        (
            c(a1),
            Cell::with_literal(c(a1), CellValue::Text(value.to_string())),
        )
    }

    fn number(a1: &str, value: f64) -> (CellRef, Cell) {
        (c(a1), Cell::with_literal(c(a1), CellValue::Number(value)))
    }

    fn column_key(letters: &str) -> SortKey {
        SortKey::column(ColumnRef::parse(letters).unwrap())
    }

    fn values(sorted: &SortedCells) -> Vec<(String, String)> {
        sorted
            .cells
            .cells()
            .values()
            .map(|cell| {
                let value = match cell.value() {
                    Some(CellValue::Text(s)) => s.clone(),
                    Some(CellValue::Number(n)) => n.to_string(),
                    other => format!("{other:?}"),
                };
                (cell.reference().to_a1(), value)
            })
            .collect()
    }

    #[test]
    fn equal_first_keys_are_ordered_by_the_second() {
        let cells = CellRange::new(
            r("A1:B2"),
            [
                text("A1", "same"),
                text("B1", "Second"),
                text("A2", "same"),
                text("B2", "First"),
            ],
        )
        .unwrap();
        let keys = [
            column_key("A").with_comparator(ValueComparator::Text),
            column_key("B").with_comparator(ValueComparator::Text),
        ];
        let sorted =
            sort_cell_range(cells, SortOrientation::Rows, &keys, &DefaultSortContext::default())
                .expect("sort should succeed");

        assert_eq!(
            values(&sorted),
            vec![
                ("A1".to_string(), "same".to_string()),
                ("A2".to_string(), "same".to_string()),
                ("B1".to_string(), "First".to_string()),
                ("B2".to_string(), "Second".to_string()),
            ]
        );
        assert_eq!(
            sorted.moves,
            vec![
                CellMove { from: c("A2"), to: c("A1") },
                CellMove { from: c("B2"), to: c("B1") },
                CellMove { from: c("A1"), to: c("A2") },
                CellMove { from: c("B1"), to: c("B2") },
            ]
        );
        assert_eq!(sorted.moves[0].offset(), (0, -1));
    }

    #[test]
    fn missing_values_sink_in_both_directions() {
        let build = || {
            CellRange::new(
                r("C3:C6"),
                [number("C3", 2.0), number("C5", 1.0), number("C6", 3.0)],
            )
            .unwrap()
        };
        let ctx = DefaultSortContext::default();

        let ascending =
            sort_cell_range(build(), SortOrientation::Rows, &[column_key("C")], &ctx).unwrap();
        let refs: Vec<String> = values(&ascending).into_iter().map(|(a1, v)| format!("{a1}={v}")).collect();
        assert_eq!(refs, vec!["C3=1", "C4=2", "C5=3"]);

        let descending = sort_cell_range(
            build(),
            SortOrientation::Rows,
            &[column_key("C").descending()],
            &ctx,
        )
        .unwrap();
        let refs: Vec<String> = values(&descending).into_iter().map(|(a1, v)| format!("{a1}={v}")).collect();
        assert_eq!(refs, vec!["C3=3", "C4=2", "C5=1"]);
    }

    #[test]
    fn columns_sort_by_row_keys() {
        let cells = CellRange::new(
            r("A1:C1"),
            [number("A1", 30.0), number("B1", 10.0), number("C1", 20.0)],
        )
        .unwrap();
        let keys = [SortKey::row(RowRef::relative(0).unwrap())];
        let sorted = sort_cell_range(
            cells,
            SortOrientation::Columns,
            &keys,
            &DefaultSortContext::default(),
        )
        .unwrap();
        let refs: Vec<String> = values(&sorted).into_iter().map(|(a1, v)| format!("{a1}={v}")).collect();
        assert_eq!(refs, vec!["A1=10", "B1=20", "C1=30"]);
    }

    #[test]
    fn stable_when_every_key_ties() {
        let cells = CellRange::new(
            r("A1:B3"),
            [
                text("A1", "x"),
                text("B1", "first"),
                text("A2", "x"),
                text("B2", "second"),
                text("A3", "x"),
                text("B3", "third"),
            ],
        )
        .unwrap();
        let sorted = sort_cell_range(
            cells.clone(),
            SortOrientation::Rows,
            &[column_key("A")],
            &DefaultSortContext::default(),
        )
        .unwrap();
        assert_eq!(sorted.cells, cells);
        assert!(sorted.moves.is_empty());
    }

    #[test]
    fn empty_lines_keep_their_place_among_missing_keys() {
        let cells = CellRange::new(
            r("A1:B4"),
            [number("A1", 2.0), text("B3", "no key"), number("A4", 1.0)],
        )
        .unwrap();
        let sorted = sort_cell_range(
            cells,
            SortOrientation::Rows,
            &[column_key("A")],
            &DefaultSortContext::default(),
        )
        .unwrap();
        let refs: Vec<String> = values(&sorted).into_iter().map(|(a1, v)| format!("{a1}={v}")).collect();
        // Row 2 was empty and ties with row 3, so it stays ahead of it.
        assert_eq!(refs, vec!["A1=1", "A2=2", "B4=no key"]);
    }

    #[test]
    fn full_sheet_selection_sorts_its_cells() {
        let cells = CellRange::new(
            r("A1:XFD1048576"),
            [
                number("A1", 3.0),
                text("XFD500", "tail"),
                number("A1048576", 1.0),
            ],
        )
        .unwrap();
        let sorted = sort_cell_range(
            cells,
            SortOrientation::Rows,
            &[column_key("A")],
            &DefaultSortContext::default(),
        )
        .unwrap();

        assert_eq!(sorted.cells.range(), r("A1:XFD1048576"));
        let refs: Vec<String> = values(&sorted).into_iter().map(|(a1, v)| format!("{a1}={v}")).collect();
        assert_eq!(refs, vec!["A1=1", "A2=3", "XFD501=tail"]);
        assert_eq!(
            sorted.moves,
            vec![
                CellMove { from: c("A1048576"), to: c("A1") },
                CellMove { from: c("A1"), to: c("A2") },
                CellMove { from: c("XFD500"), to: c("XFD501") },
            ]
        );
    }

    #[test]
    fn full_column_selection_sorts_columns_by_row_key() {
        let cells = CellRange::new(
            r("A1:XFD1"),
            [number("C1", 2.0), number("XFD1", 1.0)],
        )
        .unwrap();
        let keys = [SortKey::row(RowRef::relative(0).unwrap())];
        let sorted = sort_cell_range(
            cells,
            SortOrientation::Columns,
            &keys,
            &DefaultSortContext::default(),
        )
        .unwrap();
        let refs: Vec<String> = values(&sorted).into_iter().map(|(a1, v)| format!("{a1}={v}")).collect();
        assert_eq!(refs, vec!["A1=1", "B1=2"]);
    }

    #[test]
    fn keys_are_validated_against_the_selection() {
        let ctx = DefaultSortContext::default();
        let cells = || CellRange::new(r("B2:C3"), [number("B2", 1.0)]).unwrap();

        assert_eq!(
            sort_cell_range(cells(), SortOrientation::Rows, &[], &ctx),
            Err(SortError::EmptyKeys)
        );

        let row_key = SortKey::row(RowRef::relative(1).unwrap());
        assert_eq!(
            sort_cell_range(cells(), SortOrientation::Rows, &[row_key], &ctx),
            Err(SortError::KeyAxisMismatch {
                key: row_key.axis,
                orientation: SortOrientation::Rows,
            })
        );

        let outside = column_key("D");
        assert_eq!(
            sort_cell_range(cells(), SortOrientation::Rows, &[outside], &ctx),
            Err(SortError::KeyOutsideRange {
                key: outside.axis,
                range: r("B2:C3"),
            })
        );
    }
}
