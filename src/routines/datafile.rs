use csv::ReaderBuilder;
use eyre::{Result, WrapErr};
use std::fs::File;
use std::path::Path;

/// Read a column of scores from a CSV file.
///
/// The file must have a header row. Only the first column is used; blank
/// cells are skipped and any other cell must parse as a number.
pub fn read_scores(path: impl AsRef<Path>) -> Result<Vec<f64>> {
    let path = path.as_ref();
    let file = File::open(path).wrap_err_with(|| format!("Unable to open {:?}", path))?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut scores = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.wrap_err_with(|| format!("Malformed record in {:?}", path))?;
        let cell = match record.get(0) {
            Some(cell) if !cell.is_empty() => cell,
            _ => continue,
        };
        // Row numbers count the header as row 1
        let score = cell
            .parse::<f64>()
            .wrap_err_with(|| format!("Row {}: '{}' is not a number", i + 2, cell))?;
        scores.push(score);
    }

    tracing::debug!("Read {} scores from {:?}", scores.len(), path);
    Ok(scores)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "simplexfit_{}_{}.csv",
            name,
            std::process::id()
        ));
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn reads_first_column() {
        let path = write_temp("first_column", "hf,shooter\n5.5,a\n 7.25 ,b\n,c\n3,d\n");
        let scores = read_scores(&path).unwrap();
        assert_eq!(scores, vec![5.5, 7.25, 3.0]);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn reports_bad_rows() {
        let path = write_temp("bad_row", "hf\n1.0\nabc\n");
        let err = read_scores(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("Row 3"));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn missing_file() {
        assert!(read_scores("this/file/does/not/exist.csv").is_err());
    }
}
