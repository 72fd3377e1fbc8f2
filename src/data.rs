//! Tabular input loading.
//!
//! Reads selected columns of a comma-separated file with a header row and
//! min-max normalizes each column to `[0, 1]`.

use crate::error::{Result, SomError};
use crate::RGB_DIM;
use csv::{ReaderBuilder, Trim};
use log::{debug, info};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// A normalized feature vector.
pub type Sample = Vec<f64>;

/// Loads the requested columns of a CSV file as normalized samples.
pub fn load_samples(path: impl AsRef<Path>, columns: &[String]) -> Result<Vec<Sample>> {
    let path = path.as_ref();
    info!("Reading {} from {}", columns.join(", "), path.display());
    let file = File::open(path)?;
    read_samples(file, columns)
}

/// Reads the requested columns from CSV data as normalized samples.
///
/// Exactly [`RGB_DIM`] distinct columns must be requested and all of them must
/// appear in the header. Features are emitted in header order.
pub fn read_samples<R: Read>(reader: R, columns: &[String]) -> Result<Vec<Sample>> {
    let mut requested: Vec<&str> = Vec::with_capacity(columns.len());
    for column in columns {
        if !requested.contains(&column.as_str()) {
            requested.push(column);
        }
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);
    let headers = reader.headers()?.clone();

    let missing: Vec<String> = requested
        .iter()
        .filter(|name| !headers.iter().any(|h| h == **name))
        .map(|name| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(SomError::MissingColumn(missing));
    }

    if requested.len() != RGB_DIM {
        return Err(SomError::ColumnCount {
            expected: RGB_DIM,
            found: requested.len(),
        });
    }

    let selected: Vec<(usize, &str)> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| requested.contains(h))
        .collect();
    // Repeated header names resolve to more than the requested columns.
    if selected.len() != RGB_DIM {
        return Err(SomError::ColumnCount {
            expected: RGB_DIM,
            found: selected.len(),
        });
    }

    let mut rows: Vec<Sample> = Vec::new();
    for (row_idx, record) in reader.records().enumerate() {
        let record = record?;
        let mut row = Vec::with_capacity(RGB_DIM);
        for &(col_idx, name) in &selected {
            let field = record.get(col_idx).unwrap_or("");
            let value: f64 = field.parse().map_err(|_| {
                SomError::Data(format!(
                    "row {}: column '{}' has non-numeric value '{}'",
                    row_idx + 1,
                    name,
                    field
                ))
            })?;
            if !value.is_finite() {
                return Err(SomError::Data(format!(
                    "row {}: column '{}' is not finite",
                    row_idx + 1,
                    name
                )));
            }
            row.push(value);
        }
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(SomError::EmptyInput("input file has no data rows".to_string()));
    }

    normalize(&mut rows);
    debug!("Loaded {} samples", rows.len());
    Ok(rows)
}

/// Min-max normalizes every column in place.
///
/// A constant column maps to 0.0.
pub fn normalize(rows: &mut [Sample]) {
    let Some(first) = rows.first() else {
        return;
    };
    let dim = first.len();

    for col in 0..dim {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for row in rows.iter() {
            min = min.min(row[col]);
            max = max.max(row[col]);
        }

        let range = max - min;
        for row in rows.iter_mut() {
            row[col] = if range > 0.0 { (row[col] - min) / range } else { 0.0 };
        }
    }
}
