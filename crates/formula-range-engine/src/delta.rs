//! Cell snapshots handed to incremental-update consumers, optionally restricted to a window.

use core::fmt;

use chrono::NaiveDateTime;
use formula_refs::{CellRef, RangeRef};
use serde::{Deserialize, Serialize};

/// An evaluated cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Blank,
    Number(f64),
    Text(String),
    Bool(bool),
    DateTime(NaiveDateTime),
    /// An error value such as `#DIV/0!`, kept as its display text.
    Error(String),
}

impl CellValue {
    pub fn is_blank(&self) -> bool {
        matches!(self, CellValue::Blank)
    }
}

/// A concrete cell: where it lives, the formula text that produced it and its evaluated value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    reference: CellRef,
    #[serde(default)]
    formula: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<CellValue>,
}

impl Cell {
    pub fn new(reference: CellRef, formula: impl Into<String>) -> Self {
        Self {
            reference,
            formula: formula.into(),
            value: None,
        }
    }

    /// A cell holding a literal value; the formula text is left empty.
    pub fn with_literal(reference: CellRef, value: CellValue) -> Self {
        Self::new(reference, String::new()).with_value(value)
    }

    pub fn reference(&self) -> CellRef {
        self.reference
    }

    pub fn formula(&self) -> &str {
        &self.formula
    }

    pub fn value(&self) -> Option<&CellValue> {
        self.value.as_ref()
    }

    /// Whether the cell carries no usable value (never evaluated or blank).
    pub fn is_missing(&self) -> bool {
        self.value.as_ref().map_or(true, CellValue::is_blank)
    }

    /// Re-home the cell. An equal reference returns `self` untouched.
    #[must_use]
    pub fn set_reference(self, reference: CellRef) -> Self {
        if reference == self.reference {
            return self;
        }
        Self { reference, ..self }
    }

    #[must_use]
    pub fn with_value(self, value: CellValue) -> Self {
        Self {
            value: Some(value),
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpreadsheetId(pub u64);

impl fmt::Display for SpreadsheetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Keep the cells contained by at least one range of `window`.
pub fn window_filter<I>(cells: I, window: &[RangeRef]) -> Vec<Cell>
where
    I: IntoIterator<Item = Cell>,
{
    cells
        .into_iter()
        .filter(|cell| window.iter().any(|range| range.contains(cell.reference)))
        .collect()
}

/// A snapshot of cells, either complete or restricted to a window of ranges.
///
/// Cells are unique by reference and kept in ascending reference order; when two supplied cells
/// share a reference the later one wins. A windowed delta only exposes cells contained by its
/// window, but remembers the rest so a wider window brings them back. An empty window is the same
/// as no window.
///
/// Equality and serialization see the visible cells only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "DeltaRepr", into = "DeltaRepr")]
pub struct Delta {
    id: Option<SpreadsheetId>,
    /// Every supplied cell, unfiltered.
    all: Vec<Cell>,
    /// The cells inside the window, or all of them when there is no window.
    visible: Vec<Cell>,
    window: Option<Vec<RangeRef>>,
}

impl Delta {
    /// A non-windowed delta; `cells` are kept as given.
    pub fn new<I>(cells: I) -> Self
    where
        I: IntoIterator<Item = Cell>,
    {
        let all = normalize(cells);
        Self {
            id: None,
            visible: all.clone(),
            all,
            window: None,
        }
    }

    /// A windowed delta; cells outside every range of `window` are hidden.
    pub fn windowed<I>(cells: I, window: Vec<RangeRef>) -> Self
    where
        I: IntoIterator<Item = Cell>,
    {
        let mut delta = Self::new(cells);
        delta.set_window(window);
        delta
    }

    pub fn id(&self) -> Option<SpreadsheetId> {
        self.id
    }

    pub fn cells(&self) -> &[Cell] {
        &self.visible
    }

    pub fn cell(&self, reference: CellRef) -> Option<&Cell> {
        self.visible
            .binary_search_by_key(&reference, Cell::reference)
            .ok()
            .map(|idx| &self.visible[idx])
    }

    /// The window ranges; empty for a non-windowed delta.
    pub fn window(&self) -> &[RangeRef] {
        self.window.as_deref().unwrap_or_default()
    }

    pub fn is_windowed(&self) -> bool {
        self.window.is_some()
    }

    pub fn set_id(&mut self, id: Option<SpreadsheetId>) {
        self.id = id;
    }

    /// Replace the cells. A windowed delta exposes only those inside its window.
    pub fn set_cells<I>(&mut self, cells: I)
    where
        I: IntoIterator<Item = Cell>,
    {
        self.all = normalize(cells);
        self.refresh();
    }

    /// Replace the window and filter every supplied cell against it, including cells an earlier
    /// window hid.
    ///
    /// An empty window turns the delta into a non-windowed one and exposes every cell.
    pub fn set_window(&mut self, window: Vec<RangeRef>) {
        self.window = if window.is_empty() { None } else { Some(window) };
        self.refresh();
    }

    fn refresh(&mut self) {
        self.visible = match &self.window {
            Some(window) => {
                let visible = window_filter(self.all.iter().cloned(), window);
                log::trace!(
                    "window of {} range(s) shows {} of {} cell(s)",
                    window.len(),
                    visible.len(),
                    self.all.len()
                );
                visible
            }
            None => self.all.clone(),
        };
    }
}

impl PartialEq for Delta {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.window == other.window && self.visible == other.visible
    }
}

fn normalize<I>(cells: I) -> Vec<Cell>
where
    I: IntoIterator<Item = Cell>,
{
    let mut cells: Vec<Cell> = cells.into_iter().collect();
    // Stable sort keeps supply order within a reference, so the later duplicate ends up last.
    cells.sort_by_key(Cell::reference);
    let mut unique: Vec<Cell> = Vec::with_capacity(cells.len());
    for cell in cells {
        match unique.last_mut() {
            Some(last) if last.reference == cell.reference => *last = cell,
            _ => unique.push(cell),
        }
    }
    unique
}

#[derive(Serialize, Deserialize)]
struct DeltaRepr {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<SpreadsheetId>,
    #[serde(default)]
    cells: Vec<Cell>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    window: Option<Vec<RangeRef>>,
}

impl From<DeltaRepr> for Delta {
    fn from(repr: DeltaRepr) -> Self {
        let mut delta = match repr.window {
            Some(window) => Delta::windowed(repr.cells, window),
            None => Delta::new(repr.cells),
        };
        delta.set_id(repr.id);
        delta
    }
}

impl From<Delta> for DeltaRepr {
    fn from(delta: Delta) -> Self {
        Self {
            id: delta.id,
            cells: delta.visible,
            window: delta.window,
        }
    }
}
