use formula_refs::{CellRef, ColumnRef, RangeRef, ReferenceKind, RowRef, MAX_COLUMN, MAX_ROW};
use proptest::prelude::*;

fn arb_cell(max_col: u32, max_row: u32) -> impl Strategy<Value = CellRef> {
    (0..=max_col, 0..=max_row, any::<bool>(), any::<bool>()).prop_map(
        |(col, row, abs_col, abs_row)| {
            let kind = |abs: bool| {
                if abs {
                    ReferenceKind::Absolute
                } else {
                    ReferenceKind::Relative
                }
            };
            CellRef::new(
                ColumnRef::new(col, kind(abs_col)).unwrap(),
                RowRef::new(row, kind(abs_row)).unwrap(),
            )
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        rng_seed: proptest::test_runner::RngSeed::Fixed(0),
        failure_persistence: None,
        .. ProptestConfig::default()
    })]

    #[test]
    fn ranges_are_normalized_regardless_of_corner_order(
        a in arb_cell(40, 40),
        b in arb_cell(40, 40),
    ) {
        let range = RangeRef::new(a, b);
        prop_assert!(range.begin().column() <= range.end().column());
        prop_assert!(range.begin().row() <= range.end().row());
        prop_assert_eq!(range, RangeRef::new(b, a));
        prop_assert!(range.contains(a));
        prop_assert!(range.contains(b));
    }

    #[test]
    fn enumeration_is_row_major_and_complete(
        a in arb_cell(12, 12),
        b in arb_cell(12, 12),
    ) {
        let range = RangeRef::new(a, b);
        let cells: Vec<CellRef> = range.cells().collect();
        prop_assert_eq!(cells.len() as u64, range.cell_count());
        prop_assert_eq!(cells.first().copied(), Some(range.begin()));
        prop_assert_eq!(cells.last().copied(), Some(range.end()));

        for pair in cells.windows(2) {
            let (prev, next) = (pair[0], pair[1]);
            let row_major = (prev.row(), prev.column()) < (next.row(), next.column());
            prop_assert!(row_major, "{prev} should precede {next}");
        }
        prop_assert!(cells.iter().all(|cell| range.contains(*cell)));
    }

    #[test]
    fn from_cells_is_the_tightest_bounding_range(
        cells in proptest::collection::vec(arb_cell(60, 60), 1..16),
    ) {
        let bounds = RangeRef::from_cells(cells.iter().copied()).unwrap();
        prop_assert!(cells.iter().all(|cell| bounds.contains(*cell)));

        let min_col = cells.iter().map(|c| c.column().value()).min().unwrap();
        let max_row = cells.iter().map(|c| c.row().value()).max().unwrap();
        prop_assert_eq!(bounds.begin().column().value(), min_col);
        prop_assert_eq!(bounds.end().row().value(), max_row);
    }

    #[test]
    fn a1_text_round_trips(cell in arb_cell(MAX_COLUMN, MAX_ROW)) {
        let text = cell.to_a1();
        let parsed = CellRef::from_a1(&text).unwrap();
        prop_assert_eq!(parsed, cell);
        prop_assert_eq!(parsed.to_a1(), text);
    }
}
