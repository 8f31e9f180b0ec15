//! The view materializer: filter, sort, project and aggregate over a source
//! collection.
//!
//! Filtering and sorting a linked source produce new id orderings —
//! references into the arena, never copies — so the edit-propagation
//! invariant survives any chain of queries. Projection is the one deliberate
//! exception: it detaches.

use crate::store::{Dataset, Row, ViewRows};
use crate::value::{self, CellValue, Coerced};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Columnar aggregate over numeric-coercible, non-missing values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnStats {
    pub count: usize,
    pub sum: f64,
    pub avg: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

/// Keep the source rows satisfying the predicate, in source order.
pub fn filter<F>(dataset: &Dataset, source: &ViewRows, predicate: F) -> ViewRows
where
    F: Fn(&Row) -> bool,
{
    match source {
        ViewRows::Linked(ids) => ViewRows::Linked(
            ids.iter()
                .copied()
                .filter(|id| dataset.row(*id).map(&predicate).unwrap_or(false))
                .collect(),
        ),
        ViewRows::Projected { columns, rows } => ViewRows::Projected {
            columns: columns.clone(),
            rows: rows.iter().filter(|r| predicate(r)).cloned().collect(),
        },
    }
}

/// Stable sort of the source by one column. Missing values go to the end
/// regardless of direction; present values order numerically when both
/// coerce to numbers, lexically otherwise.
pub fn sort(
    dataset: &Dataset,
    source: &ViewRows,
    column: &str,
    direction: SortDirection,
) -> ViewRows {
    match source {
        ViewRows::Linked(ids) => {
            let mut sorted = ids.clone();
            sorted.sort_by(|a, b| {
                let cell = |id| dataset.row(id).and_then(|r| r.get(column));
                compare_cells(cell(*a), cell(*b), direction)
            });
            ViewRows::Linked(sorted)
        }
        ViewRows::Projected { columns, rows } => {
            let mut sorted = rows.clone();
            sorted.sort_by(|a, b| compare_cells(a.get(column), b.get(column), direction));
            ViewRows::Projected {
                columns: columns.clone(),
                rows: sorted,
            }
        }
    }
}

fn compare_cells(
    a: Option<&CellValue>,
    b: Option<&CellValue>,
    direction: SortDirection,
) -> Ordering {
    let ca = a.map(value::coerce).unwrap_or(Coerced::Missing);
    let cb = b.map(value::coerce).unwrap_or(Coerced::Missing);

    // Missing sorts last in both directions: decided before the direction
    // reversal applies.
    match (ca.is_missing(), cb.is_missing()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        (false, false) => {}
    }

    // Type-partitioned total order: numeric values order among themselves
    // and before any text; text orders lexically.
    let base = match (ca, cb) {
        (Coerced::Number(x), Coerced::Number(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Coerced::Number(_), Coerced::Text(_)) => Ordering::Less,
        (Coerced::Text(_), Coerced::Number(_)) => Ordering::Greater,
        (Coerced::Text(x), Coerced::Text(y)) => x.cmp(y),
        (Coerced::Missing, _) | (_, Coerced::Missing) => unreachable!(),
    };
    match direction {
        SortDirection::Ascending => base,
        SortDirection::Descending => base.reverse(),
    }
}

/// Project the source onto the named columns, producing detached copies.
/// The original row id is preserved for traceability; unknown columns are
/// skipped.
pub fn project(dataset: &Dataset, source: &ViewRows, columns: &[String]) -> ViewRows {
    let pick = |row: &Row| {
        let cells = columns
            .iter()
            .filter_map(|c| row.get(c).map(|v| (c.clone(), v.clone())))
            .collect();
        Row::new(row.id, cells)
    };

    let rows = match source {
        ViewRows::Linked(ids) => ids
            .iter()
            .filter_map(|id| dataset.row(*id))
            .map(pick)
            .collect(),
        ViewRows::Projected { rows, .. } => rows.iter().map(pick).collect(),
    };

    let known: Vec<&String> = match source {
        ViewRows::Projected {
            columns: source_cols,
            ..
        } => source_cols.iter().collect(),
        ViewRows::Linked(_) => dataset.columns().iter().collect(),
    };
    let kept = columns
        .iter()
        .filter(|c| known.contains(c))
        .cloned()
        .collect();

    ViewRows::Projected {
        columns: kept,
        rows,
    }
}

/// Aggregate one column. Non-coercible and missing values are skipped, never
/// an error; an empty result reports count 0, sum 0, avg 0 and no min/max.
pub fn stats(dataset: &Dataset, source: &ViewRows, column: &str) -> ColumnStats {
    let mut count = 0usize;
    let mut sum = 0.0f64;
    let mut min: Option<f64> = None;
    let mut max: Option<f64> = None;

    let mut visit = |row: &Row| {
        if let Some(n) = row
            .get(column)
            .map(value::coerce)
            .and_then(|c| c.as_number())
        {
            count += 1;
            sum += n;
            min = Some(min.map_or(n, |m| m.min(n)));
            max = Some(max.map_or(n, |m| m.max(n)));
        }
    };

    match source {
        ViewRows::Linked(ids) => {
            for id in ids {
                if let Some(row) = dataset.row(*id) {
                    visit(row);
                }
            }
        }
        ViewRows::Projected { rows, .. } => {
            for row in rows {
                visit(row);
            }
        }
    }

    ColumnStats {
        count,
        sum,
        avg: if count > 0 { sum / count as f64 } else { 0.0 },
        min,
        max,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::IdAssigner;
    use std::collections::HashMap;

    fn dataset() -> Dataset {
        let mut ids = IdAssigner::new();
        let mut data = Dataset::new(vec!["a".to_string(), "b".to_string()]);
        for (a, b) in [
            (CellValue::Number(1.0), CellValue::Text("x".into())),
            (CellValue::Text("NA".into()), CellValue::Text("y".into())),
            (CellValue::Number(3.0), CellValue::Text("z".into())),
        ] {
            let mut cells = HashMap::new();
            cells.insert("a".to_string(), a);
            cells.insert("b".to_string(), b);
            data.append(Row::new(ids.mint(), cells));
        }
        data
    }

    fn master_view(data: &Dataset) -> ViewRows {
        ViewRows::Linked(data.master_ids())
    }

    fn column_a(data: &Dataset, view: &ViewRows) -> Vec<CellValue> {
        match view {
            ViewRows::Linked(ids) => ids
                .iter()
                .map(|id| data.row(*id).unwrap().get("a").unwrap().clone())
                .collect(),
            ViewRows::Projected { rows, .. } => rows
                .iter()
                .map(|r| r.get("a").cloned().unwrap_or(CellValue::Missing))
                .collect(),
        }
    }

    #[test]
    fn test_filter_keeps_references() {
        let data = dataset();
        let view = filter(&data, &master_view(&data), |r| {
            matches!(value::coerce(r.get("a").unwrap()), Coerced::Number(n) if n > 1.0)
        });
        match &view {
            ViewRows::Linked(ids) => {
                assert_eq!(ids.len(), 1);
                assert_eq!(ids[0], data.master_ids()[2]);
            }
            other => panic!("expected linked view, got {other:?}"),
        }
    }

    #[test]
    fn test_sort_missing_last_both_directions() {
        let data = dataset();
        let asc = sort(&data, &master_view(&data), "a", SortDirection::Ascending);
        assert_eq!(
            column_a(&data, &asc),
            vec![
                CellValue::Number(1.0),
                CellValue::Number(3.0),
                CellValue::Text("NA".into())
            ]
        );
        let desc = sort(&data, &master_view(&data), "a", SortDirection::Descending);
        assert_eq!(
            column_a(&data, &desc),
            vec![
                CellValue::Number(3.0),
                CellValue::Number(1.0),
                CellValue::Text("NA".into())
            ]
        );
    }

    #[test]
    fn test_sort_is_stable() {
        let mut ids = IdAssigner::new();
        let mut data = Dataset::new(vec!["k".to_string(), "tag".to_string()]);
        for (k, tag) in [(1.0, "first"), (0.0, "low"), (1.0, "second"), (1.0, "third")] {
            let mut cells = HashMap::new();
            cells.insert("k".to_string(), CellValue::Number(k));
            cells.insert("tag".to_string(), CellValue::Text(tag.into()));
            data.append(Row::new(ids.mint(), cells));
        }
        let sorted = sort(
            &data,
            &ViewRows::Linked(data.master_ids()),
            "k",
            SortDirection::Ascending,
        );
        let tags: Vec<String> = match &sorted {
            ViewRows::Linked(ids) => ids
                .iter()
                .map(|id| {
                    data.row(*id)
                        .unwrap()
                        .get("tag")
                        .unwrap()
                        .display()
                        .into_owned()
                })
                .collect(),
            _ => unreachable!(),
        };
        assert_eq!(tags, vec!["low", "first", "second", "third"]);
    }

    #[test]
    fn test_sort_mixed_types_is_lexical() {
        let mut ids = IdAssigner::new();
        let mut data = Dataset::new(vec!["v".to_string()]);
        for v in [
            CellValue::Text("apple".into()),
            CellValue::Number(10.0),
            CellValue::Text("2".into()),
        ] {
            let mut cells = HashMap::new();
            cells.insert("v".to_string(), v);
            data.append(Row::new(ids.mint(), cells));
        }
        let sorted = sort(
            &data,
            &ViewRows::Linked(data.master_ids()),
            "v",
            SortDirection::Ascending,
        );
        // "2" coerces numerically and orders with 10; text lands after the
        // numeric partition.
        let shown: Vec<String> = match &sorted {
            ViewRows::Linked(ids) => ids
                .iter()
                .map(|id| data.row(*id).unwrap().get("v").unwrap().display().into_owned())
                .collect(),
            _ => unreachable!(),
        };
        assert_eq!(shown, vec!["2", "10", "apple"]);
    }

    #[test]
    fn test_project_detaches_and_keeps_ids() {
        let data = dataset();
        let view = project(&data, &master_view(&data), &["b".to_string()]);
        match &view {
            ViewRows::Projected { columns, rows } => {
                assert_eq!(columns, &["b".to_string()]);
                assert_eq!(rows.len(), 3);
                assert_eq!(rows[0].id, data.master_ids()[0]);
                assert!(rows[0].get("a").is_none());
            }
            other => panic!("expected projected view, got {other:?}"),
        }
    }

    #[test]
    fn test_project_skips_unknown_columns() {
        let data = dataset();
        let view = project(
            &data,
            &master_view(&data),
            &["b".to_string(), "ghost".to_string()],
        );
        match &view {
            ViewRows::Projected { columns, .. } => assert_eq!(columns, &["b".to_string()]),
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn test_stats_skips_non_numeric() {
        let data = dataset();
        let s = stats(&data, &master_view(&data), "a");
        assert_eq!(s.count, 2);
        assert_eq!(s.sum, 4.0);
        assert_eq!(s.avg, 2.0);
        assert_eq!(s.min, Some(1.0));
        assert_eq!(s.max, Some(3.0));
    }

    #[test]
    fn test_stats_empty_column() {
        let data = dataset();
        let s = stats(&data, &master_view(&data), "b");
        assert_eq!(s.count, 0);
        assert_eq!(s.sum, 0.0);
        assert_eq!(s.avg, 0.0);
        assert_eq!(s.min, None);
        assert_eq!(s.max, None);
    }

    #[test]
    fn test_na_filter_partitions_source() {
        let data = dataset();
        let spec_eq = crate::command::FilterSpec {
            column: "a".to_string(),
            op: crate::command::FilterOp::Eq,
            value: "NA".to_string(),
        };
        let spec_ne = crate::command::FilterSpec {
            column: "a".to_string(),
            op: crate::command::FilterOp::Ne,
            value: "NA".to_string(),
        };
        let missing = filter(&data, &master_view(&data), |r| spec_eq.matches(r));
        let present = filter(&data, &master_view(&data), |r| spec_ne.matches(r));
        assert_eq!(missing.len() + present.len(), data.len());
        if let (ViewRows::Linked(m), ViewRows::Linked(p)) = (&missing, &present) {
            assert!(m.iter().all(|id| !p.contains(id)));
        }
    }
}
