//! A comparator that ignores row order by sorting on the leading column.
//!
//! Both tables are stably sorted by the expected table's first column (looked
//! up by name in the actual table), then compared cell by cell. Rows are not
//! re-sorted on any other column: if two rows share a leading value but differ
//! elsewhere, the outcome depends on the order they arrived in. This is a known
//! limitation of the equivalence rule and is kept for compatibility with the
//! stored benchmark answers.

use crate::traits::comparator::RelationComparator;
use crate::types::Comparison;
use std::cmp::Ordering;
use util::relation::{Relation, Scalar};

pub struct LeadingColumnComparator;

impl RelationComparator for LeadingColumnComparator {
    fn compare(&self, mut expected: Relation, mut actual: Relation) -> Comparison {
        let Some(key) = expected.columns().first().cloned() else {
            return Comparison::mismatched(
                expected,
                actual,
                "expected result has no column to order by",
            );
        };
        if actual.column_index(&key).is_none() {
            return Comparison::mismatched(
                expected,
                actual,
                format!("actual result has no column '{key}'"),
            );
        }

        if let Err(reason) = sort_by_column(&mut expected, &key) {
            return Comparison::mismatched(expected, actual, format!("expected result: {reason}"));
        }
        if let Err(reason) = sort_by_column(&mut actual, &key) {
            return Comparison::mismatched(expected, actual, format!("actual result: {reason}"));
        }

        match first_difference(&expected, &actual) {
            Some(reason) => Comparison::mismatched(expected, actual, reason),
            None => Comparison::matched(expected, actual),
        }
    }
}

/// Stable ascending sort on column `key`, nulls last.
/// Fails when the column holds values of more than one kind.
fn sort_by_column(rel: &mut Relation, key: &str) -> Result<(), String> {
    let (Some(idx), Some(cells)) = (rel.column_index(key), rel.column(key)) else {
        return Err(format!("no column '{key}'"));
    };
    let mut seen = None;
    for cell in cells {
        if cell.is_null() {
            continue;
        }
        match seen {
            None => seen = Some(cell.kind()),
            Some(kind) if kind != cell.kind() => {
                return Err(format!(
                    "cannot order column '{key}': it mixes {kind:?} and {:?} values",
                    cell.kind()
                ));
            }
            Some(_) => {}
        }
    }

    rel.sort_rows_by(|a, b| order_cells(&a[idx], &b[idx]));
    Ok(())
}

fn order_cells(a: &Scalar, b: &Scalar) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.compare(b).unwrap_or(Ordering::Equal),
    }
}

fn first_difference(expected: &Relation, actual: &Relation) -> Option<String> {
    if expected.columns() != actual.columns() {
        return Some(format!(
            "columns differ: expected {:?}, got {:?}",
            expected.columns(),
            actual.columns()
        ));
    }
    if expected.len() != actual.len() {
        return Some(format!(
            "row count differs: expected {}, got {}",
            expected.len(),
            actual.len()
        ));
    }
    for (r, (e_row, a_row)) in expected.rows().iter().zip(actual.rows()).enumerate() {
        for (c, (e, a)) in e_row.iter().zip(a_row).enumerate() {
            if !e.equivalent(a) {
                return Some(format!(
                    "row {r}, column '{}': expected {e}, got {a}",
                    expected.columns()[c]
                ));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[&str], rows: Vec<Vec<Scalar>>) -> Relation {
        Relation::with_rows(columns.iter().map(|c| c.to_string()).collect(), rows).unwrap()
    }

    fn ints(values: &[i64]) -> Relation {
        Relation::single_column("0", values.iter().map(|v| Scalar::Int(*v)).collect())
    }

    #[test]
    fn test_reversed_rows_match() {
        let result = LeadingColumnComparator.compare(ints(&[1, 2, 3]), ints(&[3, 2, 1]));
        assert!(result.is_match());
        assert_eq!(result.actual, ints(&[1, 2, 3]));
    }

    #[test]
    fn test_row_count_mismatch() {
        let result = LeadingColumnComparator.compare(ints(&[6]), Relation::new(vec!["0".into()]));
        assert_eq!(
            result.mismatch.as_deref(),
            Some("row count differs: expected 1, got 0")
        );
    }

    #[test]
    fn test_cell_mismatch_names_position() {
        let expected = table(
            &["k", "v"],
            vec![
                vec![Scalar::from("a"), Scalar::Int(1)],
                vec![Scalar::from("b"), Scalar::Int(2)],
            ],
        );
        let actual = table(
            &["k", "v"],
            vec![
                vec![Scalar::from("b"), Scalar::Int(5)],
                vec![Scalar::from("a"), Scalar::Int(1)],
            ],
        );
        let result = LeadingColumnComparator.compare(expected, actual);
        assert_eq!(
            result.mismatch.as_deref(),
            Some("row 1, column 'v': expected 2, got 5")
        );
    }

    #[test]
    fn test_column_order_matters() {
        let expected = table(&["a", "b"], vec![vec![Scalar::Int(1), Scalar::Int(2)]]);
        let actual = table(&["b", "a"], vec![vec![Scalar::Int(2), Scalar::Int(1)]]);
        let result = LeadingColumnComparator.compare(expected, actual);
        assert!(result.mismatch.unwrap().starts_with("columns differ"));
    }

    #[test]
    fn test_missing_leading_column() {
        let expected = table(&["a"], vec![vec![Scalar::Int(1)]]);
        let actual = table(&["z"], vec![vec![Scalar::Int(1)]]);
        let result = LeadingColumnComparator.compare(expected, actual);
        assert_eq!(
            result.mismatch.as_deref(),
            Some("actual result has no column 'a'")
        );
    }

    #[test]
    fn test_expected_without_columns_cannot_be_ordered() {
        let result = LeadingColumnComparator.compare(Relation::default(), Relation::default());
        assert!(!result.is_match());
    }

    #[test]
    fn test_mixed_leading_column_is_incomparable() {
        let expected = ints(&[1]);
        let actual = Relation::single_column("0", vec![Scalar::Int(1), Scalar::from("1")]);
        let result = LeadingColumnComparator.compare(expected, actual);
        assert!(result.mismatch.unwrap().contains("mixes Number and Text"));
    }

    #[test]
    fn test_nulls_sort_last() {
        let expected = Relation::single_column("0", vec![Scalar::Int(2), Scalar::Null]);
        let actual = Relation::single_column("0", vec![Scalar::Null, Scalar::Int(2)]);
        assert!(LeadingColumnComparator.compare(expected, actual).is_match());
    }

    #[test]
    fn test_ties_keep_arrival_order() {
        // same leading value, different trailing column, opposite arrival order
        let expected = table(
            &["k", "v"],
            vec![
                vec![Scalar::Int(1), Scalar::from("x")],
                vec![Scalar::Int(1), Scalar::from("y")],
            ],
        );
        let actual = table(
            &["k", "v"],
            vec![
                vec![Scalar::Int(1), Scalar::from("y")],
                vec![Scalar::Int(1), Scalar::from("x")],
            ],
        );
        assert!(!LeadingColumnComparator.compare(expected, actual).is_match());
    }

    #[test]
    fn test_int_and_float_cells_differ() {
        // an average of 2 and 2 is 2.0, not the integer 2
        let expected = ints(&[2]);
        let actual = Relation::single_column("0", vec![Scalar::Float(2.0)]);
        let result = LeadingColumnComparator.compare(expected, actual);
        assert_eq!(
            result.mismatch.as_deref(),
            Some("row 0, column '0': expected 2, got 2.0")
        );
    }

    #[test]
    fn test_float_cells_match() {
        let expected = Relation::single_column("0", vec![Scalar::Float(2.5), Scalar::Float(1.0)]);
        let actual = Relation::single_column("0", vec![Scalar::Float(1.0), Scalar::Float(2.5)]);
        assert!(LeadingColumnComparator.compare(expected, actual).is_match());
    }
}
