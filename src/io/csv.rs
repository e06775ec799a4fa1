//! Column-oriented CSV output.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Write columns of equal length to a CSV file with a header row.
pub fn write_csv<P: AsRef<Path>>(path: P, headers: &[&str], columns: &[&[f64]]) -> io::Result<()> {
    if headers.len() != columns.len() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "Headers count ({}) doesn't match data columns ({})",
                headers.len(),
                columns.len()
            ),
        ));
    }
    let n_rows = columns.first().map_or(0, |c| c.len());
    if columns.iter().any(|c| c.len() != n_rows) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "CSV columns have different lengths",
        ));
    }

    let mut file = BufWriter::new(File::create(path)?);
    writeln!(file, "{}", headers.join(","))?;
    for i in 0..n_rows {
        let row: Vec<String> = columns.iter().map(|col| format!("{:.15e}", col[i])).collect();
        writeln!(file, "{}", row.join(","))?;
    }
    file.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_write_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("diag.csv");
        let t = [0.0, 0.5];
        let total = [1.0, 0.75];
        write_csv(&path, &["time", "total_oil"], &[&t, &total]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "time,total_oil");
        let values: Vec<f64> = lines[2].split(',').map(|v| v.parse().unwrap()).collect();
        assert_eq!(values, vec![0.5, 0.75]);
    }

    #[test]
    fn test_mismatched_columns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        assert!(write_csv(&path, &["a"], &[&[1.0], &[2.0]]).is_err());
        assert!(write_csv(&path, &["a", "b"], &[&[1.0], &[2.0, 3.0]]).is_err());
    }
}
