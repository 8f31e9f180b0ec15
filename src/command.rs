//! The command interpreter.
//!
//! Commands are whitespace-delimited token streams with a case-insensitive
//! verb; column names and filter values may be single- or double-quoted to
//! embed spaces (quotes are stripped before use):
//!
//! - `FILTER <column> <op> <value>` with op one of `>` `<` `=` `==` `!=`
//!   `!==` `>=` `<=` `contains`
//! - `SORT <column> [ASC|DESC]`
//! - `SELECT <col1,col2,...>`
//! - `STATS <column>`
//! - `TRIM <column>`
//! - `EXPORT <format>`
//!
//! An unrecognized verb parses to [`Command::Unrecognized`] — the engine
//! keeps the source collection unchanged but reports the outcome distinctly
//! instead of silently succeeding. A recognized verb with malformed
//! arguments is a hard error.

use crate::error::EngineError;
use crate::store::Row;
use crate::value::{self, CellValue, Coerced};
use crate::view::SortDirection;
use std::cmp::Ordering;

/// Filter comparison operators. `=`/`==` and `!=`/`!==` are spellings of the
/// same operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Gt,
    Lt,
    Ge,
    Le,
    Eq,
    Ne,
    Contains,
}

impl FilterOp {
    fn parse(token: &str) -> Option<Self> {
        match token {
            ">" => Some(FilterOp::Gt),
            "<" => Some(FilterOp::Lt),
            ">=" => Some(FilterOp::Ge),
            "<=" => Some(FilterOp::Le),
            "=" | "==" => Some(FilterOp::Eq),
            "!=" | "!==" => Some(FilterOp::Ne),
            _ if token.eq_ignore_ascii_case("contains") => Some(FilterOp::Contains),
            _ => None,
        }
    }

    fn compare(self, ord: Ordering) -> bool {
        match self {
            FilterOp::Gt => ord == Ordering::Greater,
            FilterOp::Lt => ord == Ordering::Less,
            FilterOp::Ge => ord != Ordering::Less,
            FilterOp::Le => ord != Ordering::Greater,
            FilterOp::Eq => ord == Ordering::Equal,
            FilterOp::Ne => ord != Ordering::Equal,
            FilterOp::Contains => false,
        }
    }
}

/// A parsed `FILTER` predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    pub column: String,
    pub op: FilterOp,
    pub value: String,
}

impl FilterSpec {
    /// Evaluate the predicate against one row.
    ///
    /// Both the field value and the literal go through numeric coercion; a
    /// numeric pair compares numerically, anything else textually. Missing
    /// fields are excluded from every comparison unless the literal is the
    /// missing-marker itself, where `=` matches missing rows and `!=`
    /// matches present ones.
    pub fn matches(&self, row: &Row) -> bool {
        let cell = row.get(&self.column).unwrap_or(&CellValue::Missing);
        let coerced = value::coerce(cell);

        if value::is_missing_literal(&self.value) {
            return match self.op {
                FilterOp::Eq => coerced.is_missing(),
                FilterOp::Ne => !coerced.is_missing(),
                _ => false,
            };
        }
        if coerced.is_missing() {
            return false;
        }

        let cell_text = match coerced {
            Coerced::Number(n) => value::format_number(n),
            Coerced::Text(s) => s.to_string(),
            Coerced::Missing => unreachable!(),
        };

        if self.op == FilterOp::Contains {
            return cell_text
                .to_lowercase()
                .contains(&self.value.to_lowercase());
        }

        if let (Some(a), Ok(b)) = (coerced.as_number(), self.value.trim().parse::<f64>()) {
            return self
                .op
                .compare(a.partial_cmp(&b).unwrap_or(Ordering::Equal));
        }

        match self.op {
            FilterOp::Eq => cell_text.eq_ignore_ascii_case(&self.value),
            FilterOp::Ne => !cell_text.eq_ignore_ascii_case(&self.value),
            // Ordered text comparison is case-sensitive lexicographic
            op => op.compare(cell_text.as_str().cmp(self.value.as_str())),
        }
    }
}

/// A parsed command, ready for the materializer.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Filter(FilterSpec),
    Sort {
        column: String,
        direction: SortDirection,
    },
    Select(Vec<String>),
    Stats {
        column: String,
    },
    Trim {
        column: String,
    },
    Export {
        format: String,
    },
    Unrecognized {
        verb: String,
    },
}

/// Parse a command line into a [`Command`].
pub fn parse(text: &str) -> Result<Command, EngineError> {
    let tokens = tokenize(text);
    let verb = tokens
        .first()
        .ok_or_else(|| EngineError::Malformed("empty command".to_string()))?;

    match verb.to_ascii_uppercase().as_str() {
        "FILTER" => {
            if tokens.len() != 4 {
                return Err(EngineError::Malformed(
                    "FILTER expects: FILTER <column> <op> <value>".to_string(),
                ));
            }
            let op = FilterOp::parse(&tokens[2]).ok_or_else(|| {
                EngineError::Malformed(format!("unknown filter operator '{}'", tokens[2]))
            })?;
            Ok(Command::Filter(FilterSpec {
                column: tokens[1].clone(),
                op,
                value: tokens[3].clone(),
            }))
        }
        "SORT" => {
            let direction = match tokens.len() {
                2 => SortDirection::Ascending,
                3 if tokens[2].eq_ignore_ascii_case("asc") => SortDirection::Ascending,
                3 if tokens[2].eq_ignore_ascii_case("desc") => SortDirection::Descending,
                3 => {
                    return Err(EngineError::Malformed(format!(
                        "sort direction must be ASC or DESC, got '{}'",
                        tokens[2]
                    )))
                }
                _ => {
                    return Err(EngineError::Malformed(
                        "SORT expects: SORT <column> [ASC|DESC]".to_string(),
                    ))
                }
            };
            Ok(Command::Sort {
                column: tokens[1].clone(),
                direction,
            })
        }
        "SELECT" => {
            if tokens.len() < 2 {
                return Err(EngineError::Malformed(
                    "SELECT expects a column list".to_string(),
                ));
            }
            let columns: Vec<String> = tokens[1..]
                .join(",")
                .split(',')
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect();
            if columns.is_empty() {
                return Err(EngineError::Malformed(
                    "SELECT expects a column list".to_string(),
                ));
            }
            Ok(Command::Select(columns))
        }
        "STATS" => one_column(&tokens, "STATS").map(|column| Command::Stats { column }),
        "TRIM" => one_column(&tokens, "TRIM").map(|column| Command::Trim { column }),
        "EXPORT" => one_column(&tokens, "EXPORT").map(|format| Command::Export { format }),
        _ => Ok(Command::Unrecognized { verb: verb.clone() }),
    }
}

fn one_column(tokens: &[String], verb: &str) -> Result<String, EngineError> {
    if tokens.len() != 2 {
        return Err(EngineError::Malformed(format!(
            "{verb} expects exactly one argument"
        )));
    }
    Ok(tokens[1].clone())
}

/// Split on whitespace, keeping quoted runs together and stripping the
/// quotes.
fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut in_token = false;

    for c in text.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_token = true;
            }
            None if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            None => {
                current.push(c);
                in_token = true;
            }
        }
    }
    if in_token {
        tokens.push(current);
    }
    tokens
}
