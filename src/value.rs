//! Cell values and the coercion rules shared by filtering, sorting and
//! aggregation.
//!
//! A cell is one of number, text or missing. The textual missing-marker
//! `"NA"` (and the empty string) is only recognized at comparison time,
//! through [`coerce`] — call sites never inspect the raw representation
//! themselves.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// The canonical textual spelling of a missing value.
pub const MISSING_MARKER: &str = "NA";

/// A single cell of a row.
///
/// Serialized untagged: numbers as JSON numbers, text as strings, missing as
/// `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Missing,
}

impl CellValue {
    pub fn is_missing(&self) -> bool {
        matches!(coerce(self), Coerced::Missing)
    }

    /// Human-readable rendering: integral numbers without a trailing `.0`,
    /// missing as the empty string.
    pub fn display(&self) -> Cow<'_, str> {
        match self {
            CellValue::Number(n) => Cow::Owned(format_number(*n)),
            CellValue::Text(s) => Cow::Borrowed(s.as_str()),
            CellValue::Missing => Cow::Borrowed(""),
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

/// The comparison-time shape of a cell value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coerced<'a> {
    Number(f64),
    Text(&'a str),
    Missing,
}

impl Coerced<'_> {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Coerced::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Coerced::Missing)
    }
}

/// Pure coercion of a stored cell to its comparable form.
///
/// Text that spells a number compares numerically; the missing-marker and
/// whitespace-only text compare as missing.
pub fn coerce(value: &CellValue) -> Coerced<'_> {
    match value {
        CellValue::Number(n) => Coerced::Number(*n),
        CellValue::Missing => Coerced::Missing,
        CellValue::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() || trimmed == MISSING_MARKER {
                Coerced::Missing
            } else if let Ok(n) = trimmed.parse::<f64>() {
                Coerced::Number(n)
            } else {
                Coerced::Text(s)
            }
        }
    }
}

/// True if a filter literal denotes the missing-marker.
pub fn is_missing_literal(literal: &str) -> bool {
    let trimmed = literal.trim();
    trimmed.is_empty() || trimmed == MISSING_MARKER
}

/// Render a float without a trailing `.0` when it is integral.
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}
