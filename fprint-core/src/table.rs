//! Декодированная таблица: колонки фиксированного типа, доступ по индексу.

use fprint_types::{DType, FprintError, FprintResult, RecordKind, Schema};
use serde::Serialize;

/// Значение одной ячейки.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float32(f32),
    Float64(f64),
}

/// Данные колонки.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Int64(Vec<i64>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
}

/// Именованная колонка.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

/// Неизменяемая таблица записей одного типа.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    kind: RecordKind,
    columns: Vec<Column>,
    n_rows: usize,
}

impl Value {
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::Int(v) => Some(v),
            _ => None,
        }
    }

    /// Значение как f64 (целые приводятся).
    pub fn as_f64(&self) -> f64 {
        match *self {
            Value::Int(v) => v as f64,
            Value::Float32(v) => v as f64,
            Value::Float64(v) => v,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Float32(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
        }
    }
}

impl ColumnData {
    pub fn with_capacity(
        dtype: DType,
        capacity: usize,
    ) -> Self {
        match dtype {
            DType::Int64 => ColumnData::Int64(Vec::with_capacity(capacity)),
            DType::Float32 => ColumnData::Float32(Vec::with_capacity(capacity)),
            DType::Float64 => ColumnData::Float64(Vec::with_capacity(capacity)),
        }
    }

    pub fn dtype(&self) -> DType {
        match self {
            ColumnData::Int64(_) => DType::Int64,
            ColumnData::Float32(_) => DType::Float32,
            ColumnData::Float64(_) => DType::Float64,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnData::Int64(v) => v.len(),
            ColumnData::Float32(v) => v.len(),
            ColumnData::Float64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(
        &self,
        row: usize,
    ) -> Option<Value> {
        match self {
            ColumnData::Int64(v) => v.get(row).copied().map(Value::Int),
            ColumnData::Float32(v) => v.get(row).copied().map(Value::Float32),
            ColumnData::Float64(v) => v.get(row).copied().map(Value::Float64),
        }
    }

    pub fn as_i64(&self) -> Option<&[i64]> {
        match self {
            ColumnData::Int64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<&[f32]> {
        match self {
            ColumnData::Float32(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<&[f64]> {
        match self {
            ColumnData::Float64(v) => Some(v),
            _ => None,
        }
    }
}

impl Table {
    /// Пустая таблица с колонками схемы.
    pub fn empty(schema: &Schema) -> Self {
        Self::with_capacity(schema, 0)
    }

    pub(crate) fn with_capacity(
        schema: &Schema,
        capacity: usize,
    ) -> Self {
        let columns = schema
            .fields()
            .iter()
            .map(|f| Column {
                name: f.name.clone(),
                data: ColumnData::with_capacity(f.dtype(), capacity),
            })
            .collect();

        Self {
            kind: schema.kind(),
            columns,
            n_rows: 0,
        }
    }

    /// Собирает таблицу из готовых колонок; все колонки должны быть одной
    /// длины.
    pub fn from_columns(
        kind: RecordKind,
        columns: Vec<Column>,
    ) -> FprintResult<Self> {
        let n_rows = columns.first().map_or(0, |c| c.data.len());

        if let Some(bad) = columns.iter().find(|c| c.data.len() != n_rows) {
            return Err(FprintError::corrupted(format!(
                "column '{}' has {} rows, expected {n_rows}",
                bad.name,
                bad.data.len()
            )));
        }

        Ok(Self {
            kind,
            columns,
            n_rows,
        })
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(
        &self,
        name: &str,
    ) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Ячейка (`row`, `col`).
    pub fn value(
        &self,
        row: usize,
        col: usize,
    ) -> Option<Value> {
        self.columns.get(col)?.data.get(row)
    }

    /// Строка целиком, в порядке колонок.
    pub fn row(
        &self,
        row: usize,
    ) -> Option<Vec<Value>> {
        if row >= self.n_rows {
            return None;
        }

        self.columns.iter().map(|c| c.data.get(row)).collect()
    }

    pub fn rows(&self) -> impl Iterator<Item = Vec<Value>> + '_ {
        (0..self.n_rows).filter_map(move |i| self.row(i))
    }

    pub(crate) fn push_i64(
        &mut self,
        col: usize,
        v: i64,
    ) {
        if let ColumnData::Int64(data) = &mut self.columns[col].data {
            data.push(v);
        }
    }

    pub(crate) fn push_f32(
        &mut self,
        col: usize,
        v: f32,
    ) {
        if let ColumnData::Float32(data) = &mut self.columns[col].data {
            data.push(v);
        }
    }

    pub(crate) fn push_f64(
        &mut self,
        col: usize,
        v: f64,
    ) {
        if let ColumnData::Float64(data) = &mut self.columns[col].data {
            data.push(v);
        }
    }

    /// Фиксирует строку после заполнения всех колонок.
    pub(crate) fn commit_row(&mut self) {
        self.n_rows += 1;
        debug_assert!(self.columns.iter().all(|c| c.data.len() == self.n_rows));
    }
}
