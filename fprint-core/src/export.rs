//! Экспорт таблиц в текстовые форматы (JSON, CSV).

use std::io::{BufWriter, Write};

use serde::Serialize;

use crate::{
    error::{FprintError, FprintResult},
    table::{Table, Value},
};

#[derive(Serialize)]
struct JsonTable<'a> {
    kind: &'static str,
    columns: Vec<&'a str>,
    rows: Vec<Vec<Value>>,
}

/// Пишет таблицу как JSON: `{"kind", "columns": [...], "rows": [[...]]}`.
///
/// NaN и inf сериализуются как `null`.
pub fn write_json<W: Write>(
    table: &Table,
    writer: W,
) -> FprintResult<()> {
    let doc = JsonTable {
        kind: table.kind().name(),
        columns: table.column_names().collect(),
        rows: table.rows().collect(),
    };

    let mut writer = BufWriter::new(writer);
    serde_json::to_writer(&mut writer, &doc).map_err(|e| FprintError::json(e.to_string()))?;
    writer.flush()?;

    Ok(())
}

/// Пишет таблицу как CSV с заголовком из имён колонок.
pub fn write_csv<W: Write>(
    table: &Table,
    writer: W,
) -> FprintResult<()> {
    let mut writer = BufWriter::new(writer);

    writeln!(writer, "{}", table.column_names().collect::<Vec<_>>().join(","))?;

    for row in table.rows() {
        let mut first = true;
        for value in row {
            if !first {
                write!(writer, ",")?;
            }
            write!(writer, "{value}")?;
            first = false;
        }
        writeln!(writer)?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use fprint_types::Schema;

    use super::*;
    use crate::{decoder::Decoder, stream::RawStream};

    fn info_table() -> Table {
        Decoder::new(&Schema::info())
            .decode(&RawStream::from_values(&[301., 50., 2., 2., 7., 302., 25., 1., 2., 8.]))
            .table
    }

    #[test]
    fn test_csv_layout() {
        let mut out = Vec::new();
        write_csv(&info_table(), &mut out).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "PCI,NOF_PRB,NOF_PORTS,NOF_RX_ANTENNAS,TTI\n301,50,2,2,7\n302,25,1,2,8\n"
        );
    }

    #[test]
    fn test_json_layout() {
        let mut out = Vec::new();
        write_json(&info_table(), &mut out).unwrap();

        let v: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(v["kind"], "info");
        assert_eq!(v["columns"][0], "PCI");
        assert_eq!(v["rows"].as_array().unwrap().len(), 2);
        assert_eq!(v["rows"][1][4], 8);
    }

    #[test]
    fn test_json_aux_seconds_are_floats() {
        let mut values = vec![0.0f32; 21];
        values[0] = 5000.0;
        let table = Decoder::new(&Schema::auxiliary())
            .decode(&RawStream::from_values(&values))
            .table;

        let mut out = Vec::new();
        write_json(&table, &mut out).unwrap();
        let v: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(v["kind"], "else");
        assert_eq!(v["rows"][0][0], 5.0);
    }

    #[test]
    fn test_csv_empty_table_has_header_only() {
        let mut out = Vec::new();
        write_csv(&Table::empty(&Schema::info()), &mut out).unwrap();

        assert_eq!(out.iter().filter(|&&b| b == b'\n').count(), 1);
    }
}
