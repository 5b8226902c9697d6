use crate::rebase::RebaseError;
use crate::series::Series;
use anyhow::{Context, Result, bail};
use csv::{ReaderBuilder, StringRecord, Trim, Writer};
use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

/// Cell contents read as a missing value.
const MISSING_TOKENS: [&str; 4] = ["", ".", "NA", "NaN"];

/// Read a series from CSV with a header row.
///
/// The label and value columns are located by header name, ignoring case and
/// surrounding whitespace. Other columns are ignored.
pub fn read_series<R: Read>(reader: R, label_column: &str, value_column: &str) -> Result<Series> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);

    let headers = reader.headers().context("failed to read headers")?.clone();
    let i_label = find_column(&headers, label_column)?;
    let i_value = find_column(&headers, value_column)?;

    let mut series = Series::new();
    for (idx, record) in reader.records().enumerate() {
        // Header is line 1.
        let line = idx + 2;
        let record = record.with_context(|| format!("failed to read line {line}"))?;

        let label = record.get(i_label).unwrap_or_default();
        let value = record.get(i_value).unwrap_or_default();
        let value = parse_value(label, value).with_context(|| format!("invalid line {line}"))?;

        series
            .push(label, value)
            .with_context(|| format!("invalid line {line}"))?;
    }

    Ok(series)
}

/// Write a series as CSV, with missing values as empty cells.
pub fn write_series<W: Write>(
    writer: W,
    series: &Series,
    label_column: &str,
    value_column: &str,
) -> Result<()> {
    let mut writer = Writer::from_writer(writer);

    writer
        .write_record([label_column, value_column])
        .context("failed to write headers")?;
    for (label, value) in series.iter() {
        let value = value.map(|val| val.to_string()).unwrap_or_default();
        writer
            .write_record([label, value.as_str()])
            .with_context(|| format!("failed to write entry {label:?}"))?;
    }

    writer.flush().context("failed to flush writer stream")?;

    Ok(())
}

pub fn read_series_file<P: AsRef<Path>>(
    file: P,
    label_column: &str,
    value_column: &str,
) -> Result<Series> {
    let file = file.as_ref();
    let file = File::open(file).with_context(|| format!("failed to open {file:?}"))?;
    read_series(BufReader::new(file), label_column, value_column)
}

pub fn write_series_file<P: AsRef<Path>>(
    file: P,
    series: &Series,
    label_column: &str,
    value_column: &str,
) -> Result<()> {
    let file = file.as_ref();
    let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
    write_series(BufWriter::new(file), series, label_column, value_column)
}

fn find_column(headers: &StringRecord, name: &str) -> Result<usize> {
    let position = headers.iter().position(|header| {
        // Spreadsheet exports may prefix the first header with a BOM.
        let header = header.trim_start_matches('\u{feff}').trim();
        header.eq_ignore_ascii_case(name)
    });
    match position {
        Some(idx) => Ok(idx),
        None => bail!("column {name:?} not found in headers {headers:?}"),
    }
}

fn parse_value(label: &str, value: &str) -> Result<Option<f64>, RebaseError> {
    if MISSING_TOKENS
        .iter()
        .any(|token| token.eq_ignore_ascii_case(value))
    {
        return Ok(None);
    }
    match value.parse::<f64>() {
        Ok(val) => Ok(Some(val)),
        Err(_) => Err(RebaseError::NonNumeric {
            label: label.to_string(),
            value: value.to_string(),
        }),
    }
}
