//! Synthetic agronomic dataset shared by the integration tests

use croprec_trainer::LcgRng;
use std::io::Write;
use tempfile::NamedTempFile;

/// (label, [min, max] per feature in canonical order)
const PROFILES: &[(&str, [(f64, f64); 7])] = &[
    (
        "rice",
        [(60.0, 99.0), (35.0, 60.0), (35.0, 45.0), (20.0, 27.0), (80.0, 85.0), (5.0, 8.0), (180.0, 300.0)],
    ),
    (
        "maize",
        [(60.0, 100.0), (35.0, 60.0), (15.0, 25.0), (18.0, 27.0), (55.0, 75.0), (5.5, 7.0), (60.0, 110.0)],
    ),
    (
        "chickpea",
        [(20.0, 60.0), (55.0, 80.0), (75.0, 85.0), (17.0, 21.0), (14.0, 20.0), (6.0, 9.0), (65.0, 95.0)],
    ),
    (
        "coffee",
        [(80.0, 120.0), (15.0, 40.0), (25.0, 35.0), (23.0, 28.0), (50.0, 70.0), (6.0, 7.5), (140.0, 200.0)],
    ),
];

pub const LABELS: [&str; 4] = ["chickpea", "coffee", "maize", "rice"];

/// CSV text with `rows_per_label` rows for each profile, interleaved
pub fn synthetic_csv(header: &str, rows_per_label: usize, seed: u64) -> String {
    let mut rng = LcgRng::new(seed);
    let mut csv = format!("{header}\n");

    for _ in 0..rows_per_label {
        for (label, ranges) in PROFILES {
            let values: Vec<String> = ranges
                .iter()
                .map(|(lo, hi)| {
                    let unit = rng.next_range(10_000) as f64 / 10_000.0;
                    format!("{:.2}", lo + unit * (hi - lo))
                })
                .collect();
            csv.push_str(&values.join(","));
            csv.push(',');
            csv.push_str(label);
            csv.push('\n');
        }
    }
    csv
}

pub const HEADER: &str = "N,P,K,temperature,humidity,ph,rainfall,label";

pub fn write_csv(contents: &str) -> anyhow::Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    Ok(file)
}

pub fn synthetic_dataset_file() -> anyhow::Result<NamedTempFile> {
    write_csv(&synthetic_csv(HEADER, 40, 7))
}
