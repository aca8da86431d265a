//! Публикация таблиц на диск.
//!
//! Файл сначала пишется во временный файл в той же папке, затем атомарно
//! переименовывается. Читатель никогда не видит частично записанную таблицу,
//! а падение посреди записи оставляет только временный файл.

use std::{
    fs::File,
    io::{Read, Write},
    path::Path,
};

use tempfile::NamedTempFile;

use crate::{
    error::{FprintError, FprintResult},
    export::{write_csv, write_json},
    format::{deserialize_table, serialize_table},
    table::Table,
};

/// Формат выходной таблицы.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Бинарный колоночный `.fpt`
    Fpt,
    /// JSON
    Json,
    /// CSV
    Csv,
}

/// Пишет таблицы в выбранном формате.
#[derive(Debug, Clone, Copy)]
pub struct TableWriter {
    format: OutputFormat,
    compress: bool,
}

impl OutputFormat {
    /// Расширение файла без точки.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Fpt => "fpt",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fpt" | "bin" | "binary" => Ok(OutputFormat::Fpt),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown output format '{s}'. Use: fpt, json, csv")),
        }
    }
}

impl TableWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            compress: false,
        }
    }

    /// Сжимать тело `.fpt` через LZ4 (для JSON/CSV не влияет).
    pub fn compressed(
        mut self,
        compress: bool,
    ) -> Self {
        self.compress = compress;
        self
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Кодирует таблицу в байты выбранного формата.
    pub fn encode(
        &self,
        table: &Table,
    ) -> FprintResult<Vec<u8>> {
        match self.format {
            OutputFormat::Fpt => serialize_table(table, self.compress),
            OutputFormat::Json => {
                let mut out = Vec::new();
                write_json(table, &mut out)?;
                Ok(out)
            }
            OutputFormat::Csv => {
                let mut out = Vec::new();
                write_csv(table, &mut out)?;
                Ok(out)
            }
        }
    }

    /// Кодирует и атомарно публикует таблицу. Возвращает размер файла.
    pub fn write<P: AsRef<Path>>(
        &self,
        path: P,
        table: &Table,
    ) -> FprintResult<u64> {
        let bytes = self.encode(table)?;
        publish_atomic(path, &bytes)?;
        Ok(bytes.len() as u64)
    }
}

/// Атомарно записывает `bytes` в `path` (temp-файл + rename в той же папке).
pub fn publish_atomic<P: AsRef<Path>>(
    path: P,
    bytes: &[u8],
) -> FprintResult<()> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| FprintError::Io(e.error))?;

    Ok(())
}

/// Читает таблицу `.fpt`.
pub fn read_table<P: AsRef<Path>>(path: P) -> FprintResult<Table> {
    let mut buf = Vec::new();
    File::open(path)?.read_to_end(&mut buf)?;
    deserialize_table(&buf)
}
