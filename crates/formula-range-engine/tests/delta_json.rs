use formula_range_engine::{Cell, CellValue, Delta, SpreadsheetId};
use formula_refs::{CellRef, RangeRef};
use pretty_assertions::assert_eq;
use serde_json::json;

fn c(a1: &str) -> CellRef {
    CellRef::from_a1(a1).unwrap()
}

#[test]
fn non_windowed_delta_omits_window_and_id() {
    let delta = Delta::new([Cell::new(c("A1"), "=1+1").with_value(CellValue::Number(2.0))]);
    let value = serde_json::to_value(&delta).unwrap();
    assert_eq!(
        value,
        json!({
            "cells": [
                { "reference": "A1", "formula": "=1+1", "value": { "Number": 2.0 } }
            ]
        })
    );

    let back: Delta = serde_json::from_value(value).unwrap();
    assert_eq!(back, delta);
}

#[test]
fn windowed_delta_carries_window_and_id() {
    let mut delta = Delta::windowed(
        [Cell::new(c("B2"), "=A1"), Cell::new(c("E99"), "")],
        vec![RangeRef::from_a1("A1:E5").unwrap()],
    );
    delta.set_id(Some(SpreadsheetId(42)));

    let value = serde_json::to_value(&delta).unwrap();
    assert_eq!(
        value,
        json!({
            "id": 42,
            "cells": [ { "reference": "B2", "formula": "=A1" } ],
            "window": ["A1:E5"]
        })
    );
    let back: Delta = serde_json::from_value(value).unwrap();
    assert_eq!(back, delta);
}

#[test]
fn deserialization_applies_the_window() {
    let delta: Delta = serde_json::from_value(json!({
        "cells": [
            { "reference": "A1", "formula": "" },
            { "reference": "Z26", "formula": "" }
        ],
        "window": ["A1:B2"]
    }))
    .unwrap();
    let refs: Vec<CellRef> = delta.cells().iter().map(Cell::reference).collect();
    assert_eq!(refs, vec![c("A1")]);
    assert!(delta.is_windowed());

    let err = serde_json::from_value::<Delta>(json!({
        "cells": [ { "reference": "not a cell", "formula": "" } ]
    }));
    assert!(err.is_err());
}
