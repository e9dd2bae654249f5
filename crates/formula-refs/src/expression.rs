use core::fmt;
use core::str::FromStr;

use thiserror::Error;

use crate::axis::text_serde;
use crate::{A1ParseError, CellRef, LabelName, LabelNameError, RangeRef};

/// Anything a formula may point at: a cell, a rectangular range or a label.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ExpressionRef {
    Cell(CellRef),
    Range(RangeRef),
    Label(LabelName),
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ExpressionParseError {
    #[error("invalid range reference: {0}")]
    Range(#[source] A1ParseError),
    #[error("invalid label: {0}")]
    Label(#[source] LabelNameError),
}

impl ExpressionRef {
    pub fn as_cell(&self) -> Option<CellRef> {
        match self {
            ExpressionRef::Cell(cell) => Some(*cell),
            _ => None,
        }
    }

    pub fn as_range(&self) -> Option<RangeRef> {
        match self {
            ExpressionRef::Range(range) => Some(*range),
            _ => None,
        }
    }

    pub fn as_label(&self) -> Option<&LabelName> {
        match self {
            ExpressionRef::Label(label) => Some(label),
            _ => None,
        }
    }

    /// Parse reference text.
    ///
    /// Text containing `:` is a range; text that parses as a cell is a cell; anything else must
    /// be a valid label.
    pub fn parse(text: &str) -> Result<Self, ExpressionParseError> {
        let text = text.trim();
        if text.contains(':') {
            return RangeRef::from_a1(text)
                .map(ExpressionRef::Range)
                .map_err(ExpressionParseError::Range);
        }
        if let Ok(cell) = CellRef::from_a1(text) {
            return Ok(ExpressionRef::Cell(cell));
        }
        LabelName::new(text)
            .map(ExpressionRef::Label)
            .map_err(ExpressionParseError::Label)
    }
}

impl From<CellRef> for ExpressionRef {
    fn from(value: CellRef) -> Self {
        ExpressionRef::Cell(value)
    }
}

impl From<RangeRef> for ExpressionRef {
    fn from(value: RangeRef) -> Self {
        ExpressionRef::Range(value)
    }
}

impl From<LabelName> for ExpressionRef {
    fn from(value: LabelName) -> Self {
        ExpressionRef::Label(value)
    }
}

impl fmt::Display for ExpressionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpressionRef::Cell(cell) => write!(f, "{cell}"),
            // Always spell both corners so the text parses back as a range.
            ExpressionRef::Range(range) => write!(f, "{}:{}", range.begin(), range.end()),
            ExpressionRef::Label(label) => write!(f, "{label}"),
        }
    }
}

impl FromStr for ExpressionRef {
    type Err = ExpressionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

text_serde!(ExpressionRef);
