//! Plain-text rendering of insights and verification results

use croprec_core::artifacts::ArtifactCheck;
use croprec_core::{FEATURE_COUNT, FEATURE_NAMES};
use std::fmt::Write;

pub fn label_distribution(counts: &[(String, usize)]) -> String {
    let total: usize = counts.iter().map(|(_, n)| n).sum();
    let mut out = String::from("Label distribution\n");
    for (label, count) in counts {
        let share = if total > 0 {
            100.0 * *count as f64 / total as f64
        } else {
            0.0
        };
        let _ = writeln!(out, "  {label:<14} {count:>6}  {share:>5.1}%");
    }
    let _ = writeln!(out, "  {:<14} {total:>6}", "total");
    out
}

pub fn importance_ranking(ranking: &[(&str, f64)]) -> String {
    let mut out = String::from("Feature importance\n");
    for (rank, (name, importance)) in ranking.iter().enumerate() {
        let _ = writeln!(out, "  {:>2}. {name:<12} {importance:.4}", rank + 1);
    }
    out
}

pub fn correlation_matrix(matrix: &[[f64; FEATURE_COUNT]; FEATURE_COUNT]) -> String {
    let mut out = String::from("Feature correlation\n");
    let _ = write!(out, "  {:<12}", "");
    for name in FEATURE_NAMES {
        let _ = write!(out, "{name:>12}");
    }
    out.push('\n');

    for (name, row) in FEATURE_NAMES.iter().zip(matrix) {
        let _ = write!(out, "  {name:<12}");
        for value in row {
            if value.is_nan() {
                let _ = write!(out, "{:>12}", "-");
            } else {
                let _ = write!(out, "{value:>12.3}");
            }
        }
        out.push('\n');
    }
    out
}

pub fn artifact_checks(checks: &[ArtifactCheck]) -> String {
    let mut out = String::new();
    for check in checks {
        let status = match &check.actual {
            None => "MISSING".to_string(),
            Some(_) if check.is_ok() => "ok".to_string(),
            Some(actual) => format!("MISMATCH (found {actual})"),
        };
        let _ = writeln!(out, "  {:<20} {}", check.file, status);
    }
    out
}
