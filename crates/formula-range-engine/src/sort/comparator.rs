use core::cmp::Ordering;

use chrono::{NaiveDate, NaiveDateTime};
use formula_refs::CellRef;

use super::{axis_offset, CellBuffer, SortError, SortKey, ValueComparator};
use crate::{Cell, CellValue};

/// Value comparison semantics supplied by the host (collation, case handling).
pub trait SortContext {
    /// Ascending comparison of two present, non-blank values.
    fn compare(&self, comparator: ValueComparator, left: &CellValue, right: &CellValue) -> Ordering;
}

impl<T: SortContext + ?Sized> SortContext for &T {
    fn compare(&self, comparator: ValueComparator, left: &CellValue, right: &CellValue) -> Ordering {
        (**self).compare(comparator, left, right)
    }
}

/// Locale-independent comparisons in the manner of Excel's sort dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DefaultSortContext {
    /// Applies to [`ValueComparator::Value`] and [`ValueComparator::Text`]. Excel sorts
    /// case-insensitively by default.
    pub case_sensitive: bool,
}

impl DefaultSortContext {
    pub fn case_sensitive() -> Self {
        Self {
            case_sensitive: true,
        }
    }

    fn cmp_text(&self, a: &str, b: &str) -> Ordering {
        if self.case_sensitive {
            a.cmp(b)
        } else {
            cmp_text_case_insensitive(a, b)
        }
    }

    fn cmp_mixed(&self, left: &CellValue, right: &CellValue) -> Ordering {
        let rank = kind_rank(left).cmp(&kind_rank(right));
        if rank != Ordering::Equal {
            return rank;
        }
        match (left, right) {
            (CellValue::Text(a), CellValue::Text(b)) => self.cmp_text(a, b),
            (CellValue::Bool(a), CellValue::Bool(b)) => a.cmp(b),
            (CellValue::Error(a), CellValue::Error(b)) => a.cmp(b),
            _ => match (as_number(left), as_number(right)) {
                (Some(a), Some(b)) => a.total_cmp(&b),
                _ => Ordering::Equal,
            },
        }
    }

    /// Compare with `project`; values it cannot project rank above all projected values and fall
    /// back to the mixed-type order among themselves.
    fn cmp_projected<T, F>(&self, left: &CellValue, right: &CellValue, project: F) -> Ordering
    where
        F: Fn(&CellValue) -> Option<T>,
        T: PartialOrd,
    {
        match (project(left), project(right)) {
            (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.cmp_mixed(left, right),
        }
    }
}

impl SortContext for DefaultSortContext {
    fn compare(&self, comparator: ValueComparator, left: &CellValue, right: &CellValue) -> Ordering {
        match comparator {
            ValueComparator::Value => self.cmp_mixed(left, right),
            ValueComparator::Text => self.cmp_text(&display_text(left), &display_text(right)),
            ValueComparator::TextCaseInsensitive => {
                cmp_text_case_insensitive(&display_text(left), &display_text(right))
            }
            ValueComparator::Number => self.cmp_projected(left, right, as_number),
            ValueComparator::DateTime => self.cmp_projected(left, right, |value| match value {
                CellValue::DateTime(dt) => Some(*dt),
                _ => None,
            }),
            ValueComparator::Bool => self.cmp_projected(left, right, |value| match value {
                CellValue::Bool(b) => Some(*b),
                _ => None,
            }),
        }
    }
}

fn kind_rank(value: &CellValue) -> u8 {
    match value {
        CellValue::Number(_) | CellValue::DateTime(_) => 0,
        CellValue::Text(_) => 1,
        CellValue::Bool(_) => 2,
        CellValue::Error(_) => 3,
        CellValue::Blank => 4,
    }
}

/// Numbers as is, date-times as Excel serial numbers (1900 date system).
fn as_number(value: &CellValue) -> Option<f64> {
    match value {
        CellValue::Number(n) => Some(*n),
        CellValue::DateTime(dt) => excel_serial(*dt),
        _ => None,
    }
}

fn excel_serial(dt: NaiveDateTime) -> Option<f64> {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = dt.signed_duration_since(epoch).num_milliseconds();
    Some(millis as f64 / 86_400_000.0)
}

fn display_text(value: &CellValue) -> String {
    match value {
        CellValue::Blank => String::new(),
        CellValue::Number(n) => n.to_string(),
        CellValue::Text(s) => s.clone(),
        CellValue::Bool(true) => "TRUE".to_string(),
        CellValue::Bool(false) => "FALSE".to_string(),
        CellValue::DateTime(dt) => dt.to_string(),
        CellValue::Error(e) => e.clone(),
    }
}

fn cmp_text_case_insensitive(a: &str, b: &str) -> Ordering {
    if a.is_ascii() && b.is_ascii() {
        let a = a.bytes().map(|byte| byte.to_ascii_uppercase());
        let b = b.bytes().map(|byte| byte.to_ascii_uppercase());
        return a.cmp(b);
    }

    // Unicode-aware uppercasing (e.g. ß -> SS).
    let a = a.chars().flat_map(char::to_uppercase);
    let b = b.chars().flat_map(char::to_uppercase);
    a.cmp(b)
}

/// Orders staged buffers key by key.
///
/// Key positions are relative to `origin`: a column key on column `D` with origin `B1` reads
/// slot 2 of each buffer.
pub struct RangeComparator<'c, C: SortContext + ?Sized> {
    origin: CellRef,
    keys: Vec<SortKey>,
    ctx: &'c C,
}

impl<'c, C: SortContext + ?Sized> RangeComparator<'c, C> {
    pub fn new(origin: CellRef, keys: Vec<SortKey>, ctx: &'c C) -> Result<Self, SortError> {
        if keys.is_empty() {
            return Err(SortError::EmptyKeys);
        }
        Ok(Self { origin, keys, ctx })
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    /// Compare two buffers.
    ///
    /// Blank and absent cells sort after present values whatever the key's direction. Keys that
    /// tie fall through to the next key; when every key ties the buffers compare equal, so a
    /// stable sort keeps their original order.
    pub fn compare(&self, left: &CellBuffer, right: &CellBuffer) -> Ordering {
        for key in &self.keys {
            let index = axis_offset(key.axis, self.origin);
            let lhs = index.and_then(|index| present_value(left.get(index)));
            let rhs = index.and_then(|index| present_value(right.get(index)));

            let ord = match (lhs, rhs) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => key.direction.apply(self.ctx.compare(key.comparator, a, b)),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}

fn present_value(cell: Option<&Cell>) -> Option<&CellValue> {
    cell.filter(|cell| !cell.is_missing()).and_then(Cell::value)
}
