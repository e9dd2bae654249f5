//! Column and row coordinates.
//!
//! Both axes store a **0-indexed** value plus a [`ReferenceKind`]. The kind only changes how the
//! coordinate is rendered (`$A` vs `A`, `$1` vs `1`); equality, hashing and ordering look at the
//! value alone.

use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{A1ParseError, ReferenceError};

/// Excel-compatible maximum rows per worksheet (1,048,576).
pub const EXCEL_MAX_ROWS: u32 = 1_048_576;

/// Excel-compatible maximum columns per worksheet (16,384).
pub const EXCEL_MAX_COLS: u32 = 16_384;

/// Largest 0-indexed column value (`XFD`).
pub const MAX_COLUMN: u32 = EXCEL_MAX_COLS - 1;

/// Largest 0-indexed row value (row `1048576`).
pub const MAX_ROW: u32 = EXCEL_MAX_ROWS - 1;

/// Whether a coordinate is pinned (`$`) or relative when rendered.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    Absolute,
    #[default]
    Relative,
}

impl ReferenceKind {
    #[inline]
    pub const fn is_absolute(self) -> bool {
        matches!(self, ReferenceKind::Absolute)
    }

    #[inline]
    const fn prefix(self) -> &'static str {
        match self {
            ReferenceKind::Absolute => "$",
            ReferenceKind::Relative => "",
        }
    }

    fn strip(text: &str) -> (Self, &str) {
        match text.strip_prefix('$') {
            Some(rest) => (ReferenceKind::Absolute, rest),
            None => (ReferenceKind::Relative, text),
        }
    }
}

/// Apply a signed delta to an axis value, reporting which bound was crossed.
fn offset_value(value: u32, delta: i64, max: u32) -> Result<u32, Bound> {
    let target = i64::from(value).saturating_add(delta);
    if target < 0 {
        return Err(Bound::Negative(target));
    }
    if target > i64::from(max) {
        return Err(Bound::Overflow(target));
    }
    Ok(target as u32)
}

enum Bound {
    Negative(i64),
    Overflow(i64),
}

/// A column coordinate (`A`, `$XFD`).
#[derive(Copy, Clone, Debug)]
pub struct ColumnRef {
    value: u32,
    kind: ReferenceKind,
}

impl ColumnRef {
    /// Construct a column, failing when `value` exceeds [`MAX_COLUMN`].
    pub fn new(value: u32, kind: ReferenceKind) -> Result<Self, ReferenceError> {
        if value > MAX_COLUMN {
            return Err(ReferenceError::ColumnOverflow {
                value: i64::from(value),
            });
        }
        Ok(Self { value, kind })
    }

    pub fn relative(value: u32) -> Result<Self, ReferenceError> {
        Self::new(value, ReferenceKind::Relative)
    }

    pub fn absolute(value: u32) -> Result<Self, ReferenceError> {
        Self::new(value, ReferenceKind::Absolute)
    }

    /// Callers guarantee `value <= MAX_COLUMN` (e.g. when iterating inside a range).
    #[inline]
    pub(crate) const fn new_unchecked(value: u32, kind: ReferenceKind) -> Self {
        Self { value, kind }
    }

    /// 0-indexed column value.
    #[inline]
    pub const fn value(self) -> u32 {
        self.value
    }

    #[inline]
    pub const fn kind(self) -> ReferenceKind {
        self.kind
    }

    /// Replace the value, keeping the kind. An unchanged value returns `self` as is.
    pub fn set_value(self, value: u32) -> Result<Self, ReferenceError> {
        if value == self.value {
            return Ok(self);
        }
        Self::new(value, self.kind)
    }

    #[must_use]
    pub const fn set_kind(self, kind: ReferenceKind) -> Self {
        Self {
            value: self.value,
            kind,
        }
    }

    /// Shift by `delta` columns. A zero delta returns `self` as is.
    pub fn add(self, delta: i64) -> Result<Self, ReferenceError> {
        if delta == 0 {
            return Ok(self);
        }
        match offset_value(self.value, delta, MAX_COLUMN) {
            Ok(value) => Ok(Self {
                value,
                kind: self.kind,
            }),
            Err(Bound::Negative(value)) => Err(ReferenceError::NegativeColumn { value }),
            Err(Bound::Overflow(value)) => Err(ReferenceError::ColumnOverflow { value }),
        }
    }

    /// Parse `[$]LETTERS` (letters are case-insensitive).
    pub fn parse(text: &str) -> Result<Self, A1ParseError> {
        if text.is_empty() {
            return Err(A1ParseError::Empty);
        }
        let (kind, letters) = ReferenceKind::strip(text);
        if letters.is_empty() {
            return Err(A1ParseError::MissingColumn);
        }
        let value = letters_to_column(letters)?;
        Ok(Self { value, kind })
    }
}

impl PartialEq for ColumnRef {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for ColumnRef {}

impl Hash for ColumnRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl PartialOrd for ColumnRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ColumnRef {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.prefix())?;
        f.write_str(&column_to_letters(self.value))
    }
}

impl FromStr for ColumnRef {
    type Err = A1ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A row coordinate (`1`, `$1048576`). Rendered 1-based, stored 0-based.
#[derive(Copy, Clone, Debug)]
pub struct RowRef {
    value: u32,
    kind: ReferenceKind,
}

impl RowRef {
    /// Construct a row, failing when `value` exceeds [`MAX_ROW`].
    pub fn new(value: u32, kind: ReferenceKind) -> Result<Self, ReferenceError> {
        if value > MAX_ROW {
            return Err(ReferenceError::RowOverflow {
                value: i64::from(value),
            });
        }
        Ok(Self { value, kind })
    }

    pub fn relative(value: u32) -> Result<Self, ReferenceError> {
        Self::new(value, ReferenceKind::Relative)
    }

    pub fn absolute(value: u32) -> Result<Self, ReferenceError> {
        Self::new(value, ReferenceKind::Absolute)
    }

    #[inline]
    pub(crate) const fn new_unchecked(value: u32, kind: ReferenceKind) -> Self {
        Self { value, kind }
    }

    /// 0-indexed row value.
    #[inline]
    pub const fn value(self) -> u32 {
        self.value
    }

    #[inline]
    pub const fn kind(self) -> ReferenceKind {
        self.kind
    }

    /// Replace the value, keeping the kind. An unchanged value returns `self` as is.
    pub fn set_value(self, value: u32) -> Result<Self, ReferenceError> {
        if value == self.value {
            return Ok(self);
        }
        Self::new(value, self.kind)
    }

    #[must_use]
    pub const fn set_kind(self, kind: ReferenceKind) -> Self {
        Self {
            value: self.value,
            kind,
        }
    }

    /// Shift by `delta` rows. A zero delta returns `self` as is.
    pub fn add(self, delta: i64) -> Result<Self, ReferenceError> {
        if delta == 0 {
            return Ok(self);
        }
        match offset_value(self.value, delta, MAX_ROW) {
            Ok(value) => Ok(Self {
                value,
                kind: self.kind,
            }),
            Err(Bound::Negative(value)) => Err(ReferenceError::NegativeRow { value }),
            Err(Bound::Overflow(value)) => Err(ReferenceError::RowOverflow { value }),
        }
    }

    /// Parse `[$]DIGITS` where the digits are the 1-based row number.
    pub fn parse(text: &str) -> Result<Self, A1ParseError> {
        if text.is_empty() {
            return Err(A1ParseError::Empty);
        }
        let (kind, digits) = ReferenceKind::strip(text);
        if digits.is_empty() {
            return Err(A1ParseError::MissingRow);
        }
        let numeric = digits.bytes().take_while(u8::is_ascii_digit).count();
        if numeric == 0 {
            return Err(A1ParseError::InvalidRow);
        }
        if numeric != digits.len() {
            return Err(A1ParseError::TrailingCharacters);
        }
        let row_1_based: u32 = digits
            .parse()
            .map_err(|_| A1ParseError::RowOutOfBounds)?;
        if row_1_based == 0 {
            return Err(A1ParseError::InvalidRow);
        }
        if row_1_based > EXCEL_MAX_ROWS {
            return Err(A1ParseError::RowOutOfBounds);
        }
        Ok(Self {
            value: row_1_based - 1,
            kind,
        })
    }
}

impl PartialEq for RowRef {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for RowRef {}

impl Hash for RowRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl PartialOrd for RowRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RowRef {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

impl fmt::Display for RowRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind.prefix(), u64::from(self.value) + 1)
    }
}

impl FromStr for RowRef {
    type Err = A1ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

macro_rules! text_serde {
    ($ty:ty) => {
        impl serde::Serialize for $ty {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let text = <String as serde::Deserialize>::deserialize(deserializer)?;
                text.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

pub(crate) use text_serde;

text_serde!(ColumnRef);
text_serde!(RowRef);

/// Convert a 0-indexed column into letters (`0 -> A`, `25 -> Z`, `26 -> AA`).
pub fn column_to_letters(col: u32) -> String {
    let mut n = u64::from(col) + 1;
    let mut out = Vec::<u8>::with_capacity(3);
    while n > 0 {
        let rem = (n - 1) % 26;
        out.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    out.reverse();
    out.into_iter().map(char::from).collect()
}

/// Convert column letters into a 0-indexed column, rejecting values past [`MAX_COLUMN`].
pub fn letters_to_column(letters: &str) -> Result<u32, A1ParseError> {
    if letters.is_empty() {
        return Err(A1ParseError::MissingColumn);
    }
    let mut col: u32 = 0;
    for b in letters.bytes() {
        if !b.is_ascii_alphabetic() {
            return Err(A1ParseError::InvalidColumn);
        }
        let v = u32::from(b.to_ascii_uppercase() - b'A') + 1;
        col = col
            .checked_mul(26)
            .and_then(|c| c.checked_add(v))
            .ok_or(A1ParseError::ColumnOutOfBounds)?;
    }
    if col > EXCEL_MAX_COLS {
        return Err(A1ParseError::ColumnOutOfBounds);
    }
    Ok(col - 1)
}
