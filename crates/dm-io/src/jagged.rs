//! Helpers for per-event variable-length columns shared by the readers.

use crate::error::{LoadError, Result};

/// Concatenate per-event rows into `(lengths, flat values)`.
#[cfg_attr(not(feature = "root"), allow(dead_code))]
pub(crate) fn flatten_rows<T>(rows: impl IntoIterator<Item = Vec<T>>) -> (Vec<u32>, Vec<T>) {
    let mut lengths = Vec::new();
    let mut flat = Vec::new();
    for row in rows {
        lengths.push(row.len() as u32);
        flat.extend(row);
    }
    (lengths, flat)
}

/// Require `got` (lengths of column `col`) to equal `expected` (lengths of
/// column `reference`), row by row.
pub(crate) fn check_lengths(
    col: &str,
    got: &[u32],
    reference: &str,
    expected: &[u32],
) -> Result<()> {
    if got.len() != expected.len() {
        return Err(LoadError::Inconsistent {
            col: col.into(),
            detail: format!("{} events but {reference} has {}", got.len(), expected.len()),
        });
    }
    match got.iter().zip(expected).position(|(a, b)| a != b) {
        None => Ok(()),
        Some(row) => Err(LoadError::Inconsistent {
            col: col.into(),
            detail: format!(
                "row {row}: {} entries but {reference} has {}",
                got[row], expected[row]
            ),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flatten_builds_lengths_and_values() {
        let rows = vec![vec![1.0_f32, 2.0], vec![], vec![3.0, 4.0, 5.0]];
        let (lengths, flat) = flatten_rows(rows);
        assert_eq!(lengths, [2, 0, 3]);
        assert_eq!(flat, [1.0, 2.0, 3.0, 4.0, 5.0]);

        let (lengths, flat) = flatten_rows(Vec::<Vec<i32>>::new());
        assert!(lengths.is_empty() && flat.is_empty());
    }

    #[test]
    fn matching_lengths_pass() {
        check_lengths("Muon_eta", &[2, 0, 3], "nMuon", &[2, 0, 3]).unwrap();
    }

    #[test]
    fn row_mismatch_is_inconsistent() {
        let err = check_lengths("Muon_charge", &[2, 1, 3], "nMuon", &[2, 0, 3]).unwrap_err();
        match err {
            LoadError::Inconsistent { col, detail } => {
                assert_eq!(col, "Muon_charge");
                assert!(detail.starts_with("row 1:"), "{detail}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn event_count_mismatch_is_inconsistent() {
        let err = check_lengths("Muon_pt", &[2, 2], "nMuon", &[2, 2, 2]).unwrap_err();
        assert!(matches!(err, LoadError::Inconsistent { .. }));
        assert!(err.to_string().contains("2 events but nMuon has 3"), "{err}");
    }
}
