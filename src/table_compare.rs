//! Bag equality of two concrete result tables up to column permutation.
//!
//! Per-column value multisets act as signatures: columns with a unique
//! matching signature are paired greedily, and only when signatures are
//! ambiguous does the check fall back to backtracking over the
//! signature-compatible permutations.

use std::collections::HashMap;

use thiserror::Error;

/// One cell of a concrete result table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CellValue {
    Int(i64),
    Text(String),
    Null,
}

pub type Row = Vec<CellValue>;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum TableCompareError {
    #[error("Rows in table {table} do not all have {expected} columns")]
    RaggedRows { table: u8, expected: usize },
}

type Signature = HashMap<CellValue, usize>;

fn column_signature(rows: &[Row], idx: usize) -> Signature {
    let mut signature = Signature::new();
    for row in rows {
        *signature.entry(row[idx].clone()).or_insert(0) += 1;
    }
    signature
}

fn bags_equal(rows1: &[Row], rows2: &[Row], perm: &[usize]) -> bool {
    let mut counts: HashMap<Vec<&CellValue>, i64> = HashMap::new();
    for row in rows1 {
        *counts.entry(row.iter().collect()).or_insert(0) += 1;
    }
    for row in rows2 {
        let permuted: Vec<&CellValue> = perm.iter().map(|idx| &row[*idx]).collect();
        *counts.entry(permuted).or_insert(0) -= 1;
    }
    counts.values().all(|count| *count == 0)
}

/// Greedy pass: pair each left column with its unique signature match.
fn greedy_match(sig1: &[Signature], sig2: &[Signature]) -> Option<Vec<usize>> {
    let mut mapping: Vec<Option<usize>> = vec![None; sig1.len()];
    let mut used = vec![false; sig2.len()];
    for (idx, sig) in sig1.iter().enumerate() {
        let candidates: Vec<usize> = sig2
            .iter()
            .enumerate()
            .filter(|(j, other)| !used[*j] && *other == sig)
            .map(|(j, _)| j)
            .collect();
        if candidates.len() == 1 {
            mapping[idx] = Some(candidates[0]);
            used[candidates[0]] = true;
        }
    }
    mapping.into_iter().collect()
}

fn backtrack(
    positions: &[Vec<usize>],
    depth: usize,
    used: &mut Vec<bool>,
    current: &mut Vec<usize>,
    rows1: &[Row],
    rows2: &[Row],
) -> bool {
    if depth == positions.len() {
        return bags_equal(rows1, rows2, current);
    }
    for &candidate in &positions[depth] {
        if used[candidate] {
            continue;
        }
        used[candidate] = true;
        current.push(candidate);
        if backtrack(positions, depth + 1, used, current, rows1, rows2) {
            return true;
        }
        current.pop();
        used[candidate] = false;
    }
    false
}

/// Two tables are equivalent iff they have the same row count and arity and
/// some column permutation makes their row bags equal. Empty tables are
/// equivalent.
pub fn tables_equivalent(rows1: &[Row], rows2: &[Row]) -> Result<bool, TableCompareError> {
    if rows1.is_empty() && rows2.is_empty() {
        return Ok(true);
    }
    if rows1.len() != rows2.len() {
        return Ok(false);
    }
    let arity = rows1[0].len();
    if rows1.iter().any(|row| row.len() != arity) {
        return Err(TableCompareError::RaggedRows {
            table: 1,
            expected: arity,
        });
    }
    if rows2.iter().any(|row| row.len() != arity) {
        return Err(TableCompareError::RaggedRows {
            table: 2,
            expected: arity,
        });
    }

    let sig1: Vec<Signature> = (0..arity).map(|idx| column_signature(rows1, idx)).collect();
    let sig2: Vec<Signature> = (0..arity).map(|idx| column_signature(rows2, idx)).collect();

    if let Some(mapping) = greedy_match(&sig1, &sig2) {
        return Ok(bags_equal(rows1, rows2, &mapping));
    }

    // Signatures collide: enumerate permutations that respect them.
    let mut positions: Vec<Vec<usize>> = Vec::with_capacity(arity);
    for sig in &sig1 {
        let candidates: Vec<usize> = sig2
            .iter()
            .enumerate()
            .filter(|(_, other)| *other == sig)
            .map(|(j, _)| j)
            .collect();
        if candidates.is_empty() {
            return Ok(false);
        }
        positions.push(candidates);
    }
    let mut used = vec![false; arity];
    let mut current = Vec::with_capacity(arity);
    Ok(backtrack(
        &positions,
        0,
        &mut used,
        &mut current,
        rows1,
        rows2,
    ))
}
