use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::str::FromStr;

use thiserror::Error;

use crate::axis::text_serde;
use crate::{CellRef, ExpressionRef};

/// Maximum length of a label in characters (Excel-compatible).
pub const LABEL_MAX_LEN: usize = 255;

/// Validation errors for label names.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LabelNameError {
    #[error("label cannot be empty")]
    Empty,
    #[error("label is too long ({len} > {max})")]
    TooLong { len: usize, max: usize },
    #[error("invalid first character '{0}' (must start with a letter, '_' or '\\')")]
    InvalidStartCharacter(char),
    #[error("invalid character '{ch}' at index {index}")]
    InvalidCharacter { ch: char, index: usize },
    #[error("label cannot look like a cell reference (e.g. A1 or R1C1)")]
    LooksLikeCellReference,
}

/// `R`, `C`, or `R<digits?>C<digits?>` in any case, as R1C1 notation would read it.
fn is_r1c1_reference(name: &str) -> bool {
    let upper = name.to_ascii_uppercase();
    if upper == "R" || upper == "C" {
        return true;
    }
    let Some(rest) = upper.strip_prefix('R') else {
        return false;
    };
    rest.trim_start_matches(|ch: char| ch.is_ascii_digit())
        .strip_prefix('C')
        .is_some_and(|column| column.bytes().all(|byte| byte.is_ascii_digit()))
}

/// Validate a label name.
///
/// - must not be empty or longer than [`LABEL_MAX_LEN`]
/// - must start with a letter, `_`, or `\`
/// - remaining characters may be letters, digits, `_`, or `.`
/// - must not parse as a cell reference (`A1`, `xfd9`) nor match an R1C1 reference
pub fn validate_label_name(name: &str) -> Result<(), LabelNameError> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err(LabelNameError::Empty);
    };

    let len = name.chars().count();
    if len > LABEL_MAX_LEN {
        return Err(LabelNameError::TooLong {
            len,
            max: LABEL_MAX_LEN,
        });
    }

    if CellRef::from_a1(name).is_ok() || is_r1c1_reference(name) {
        return Err(LabelNameError::LooksLikeCellReference);
    }

    if !(first.is_alphabetic() || first == '_' || first == '\\') {
        return Err(LabelNameError::InvalidStartCharacter(first));
    }

    for (index, ch) in name.chars().enumerate().skip(1) {
        if !(ch.is_alphabetic() || ch.is_ascii_digit() || ch == '_' || ch == '.') {
            return Err(LabelNameError::InvalidCharacter { ch, index });
        }
    }

    Ok(())
}

/// A named indirection (e.g. `Revenue`) that resolves to a cell, a range or another label.
///
/// Comparison is case-insensitive (`revenue == REVENUE`); the spelling it was created with is
/// kept for display.
#[derive(Clone, Debug)]
pub struct LabelName(String);

impl LabelName {
    pub fn new(name: impl Into<String>) -> Result<Self, LabelNameError> {
        let name = name.into();
        validate_label_name(&name)?;
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn folded(&self) -> impl Iterator<Item = char> + '_ {
        self.0.chars().flat_map(char::to_uppercase)
    }
}

impl PartialEq for LabelName {
    fn eq(&self, other: &Self) -> bool {
        if self.0.is_ascii() && other.0.is_ascii() {
            return self.0.eq_ignore_ascii_case(&other.0);
        }
        self.folded().eq(other.folded())
    }
}

impl Eq for LabelName {}

impl Hash for LabelName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for ch in self.folded() {
            ch.hash(state);
        }
    }
}

impl PartialOrd for LabelName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LabelName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.folded().cmp(other.folded())
    }
}

impl AsRef<str> for LabelName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LabelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for LabelName {
    type Err = LabelNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<&str> for LabelName {
    type Error = LabelNameError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

text_serde!(LabelName);

/// A label together with the reference it stands for.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct LabelMapping {
    label: LabelName,
    reference: ExpressionRef,
}

impl LabelMapping {
    pub fn new(label: LabelName, reference: impl Into<ExpressionRef>) -> Self {
        Self {
            label,
            reference: reference.into(),
        }
    }

    pub fn label(&self) -> &LabelName {
        &self.label
    }

    pub fn reference(&self) -> &ExpressionRef {
        &self.reference
    }

    /// Replace the label; an equal label leaves the mapping untouched.
    #[must_use]
    pub fn set_label(self, label: LabelName) -> Self {
        if label == self.label {
            return self;
        }
        Self { label, ..self }
    }

    /// Replace the reference; an equal reference leaves the mapping untouched.
    #[must_use]
    pub fn set_reference(self, reference: impl Into<ExpressionRef>) -> Self {
        let reference = reference.into();
        if reference == self.reference {
            return self;
        }
        Self { reference, ..self }
    }

    pub fn into_parts(self) -> (LabelName, ExpressionRef) {
        (self.label, self.reference)
    }
}
