//! The trivial normalization backend: compares the canonical transpilation
//! of the Cypher query against the candidate SQL as whitespace-collapsed,
//! lowercased strings. Cheap, sound for `Equivalent` only in the textual
//! sense, and kept as an opt-in mode.

use super::report::{Report, Verdict};

pub fn normalize_sql(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end_matches(';')
        .trim_end()
        .to_string()
}

pub fn verify_normalized(transpiled: &str, candidate: &str) -> Report {
    let norm1 = normalize_sql(transpiled);
    let norm2 = normalize_sql(candidate);
    let result = if norm1 == norm2 {
        Verdict::Equivalent
    } else {
        Verdict::NotEquivalent
    };
    Report::new(result)
        .with_detail("backend", "normalize")
        .with_detail("normalized_sql1", norm1)
        .with_detail("normalized_sql2", norm2)
}
