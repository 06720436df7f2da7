use std::path::Path;

use anyhow::{Context, Result, bail};

use super::model::RawTable;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a flat numeric table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.txt` / `.out` / `.dat` – whitespace-delimited columns, `#` comments
/// * `.csv`                   – comma-separated, optional header row
///
/// The fixed column layout is energy in column 0 and flux or flux-bound
/// values in columns 1.. .  A malformed row is a fatal load error; partial
/// tables are never returned.
pub fn load_table(path: &Path) -> Result<RawTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("table")
        .to_string();

    match ext.as_str() {
        "txt" | "out" | "dat" => load_whitespace(path, &name),
        "csv" => load_csv(path, &name),
        other => bail!("Unsupported table extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// Whitespace-delimited loader
// ---------------------------------------------------------------------------

/// One sample per line, columns separated by any run of whitespace.
/// Blank lines and lines starting with `#` are skipped.
fn load_whitespace(path: &Path, name: &str) -> Result<RawTable> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading table {}", path.display()))?;

    let mut rows: Vec<Vec<f64>> = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let row = trimmed
            .split_whitespace()
            .map(|tok| {
                tok.parse::<f64>()
                    .with_context(|| format!("line {}: '{tok}' is not a number", line_no + 1))
            })
            .collect::<Result<Vec<f64>>>()?;
        rows.push(row);
    }

    if rows.is_empty() {
        bail!("{name}: table is empty");
    }

    RawTable::from_rows(name, &rows).with_context(|| format!("table {}", path.display()))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: every field numeric.  A first row that fails to parse as
/// numbers is treated as a header and skipped; any later parse failure is
/// an error.
fn load_csv(path: &Path, name: &str) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("opening CSV {}", path.display()))?;

    let mut rows: Vec<Vec<f64>> = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let parsed: Result<Vec<f64>> = record
            .iter()
            .map(|tok| {
                tok.parse::<f64>()
                    .with_context(|| format!("CSV row {row_no}: '{tok}' is not a number"))
            })
            .collect();
        match parsed {
            Ok(row) => rows.push(row),
            // Tolerate a single leading header row only.
            Err(_) if row_no == 0 => continue,
            Err(e) => return Err(e),
        }
    }

    if rows.is_empty() {
        bail!("{name}: table is empty");
    }

    RawTable::from_rows(name, &rows).with_context(|| format!("table {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn whitespace_table_with_comments() {
        let path = write_temp(
            "nufluxview_loader_ws.out",
            "# energy flux\n1.0e5  2.5e-8\n2.0e5\t3.5e-8\n\n3.0e5   4.5e-8\n",
        );
        let t = load_table(&path).unwrap();
        assert_eq!(t.n_rows(), 3);
        assert_eq!(t.n_columns(), 2);
        assert_eq!(t.column(0).unwrap()[1], 2.0e5);
        assert_eq!(t.column(1).unwrap()[2], 4.5e-8);
    }

    #[test]
    fn ragged_row_is_fatal() {
        let path = write_temp("nufluxview_loader_ragged.out", "1.0 2.0\n3.0\n");
        assert!(load_table(&path).is_err());
    }

    #[test]
    fn non_numeric_field_is_fatal() {
        let path = write_temp("nufluxview_loader_text.out", "1.0 2.0\n3.0 abc\n");
        assert!(load_table(&path).is_err());
    }

    #[test]
    fn csv_with_header() {
        let path = write_temp(
            "nufluxview_loader.csv",
            "energy,flux\n1.0e5,2.5e-8\n2.0e5,3.5e-8\n",
        );
        let t = load_table(&path).unwrap();
        assert_eq!(t.n_rows(), 2);
        assert_eq!(t.column(1).unwrap()[0], 2.5e-8);
    }

    #[test]
    fn unknown_extension_rejected() {
        let path = write_temp("nufluxview_loader.parquet", "");
        assert!(load_table(&path).is_err());
    }
}
