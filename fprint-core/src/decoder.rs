//! Декодирование захвата в типизированную таблицу.
//!
//! Один обобщённый декодер для всех типов записей: режим разбиения берётся
//! из `Framing` схемы, семантика полей из `FieldSpec`.

use std::path::Path;

use fprint_types::{Coercion, FieldSpec, Framing, Schema, Unit};
use log::debug;

use crate::{
    error::FprintResult,
    resync::{aligned_spans, RecordSpan, ResyncStats, Resynchronizer},
    stream::RawStream,
    table::Table,
};

/// Статистика декодирования одного захвата.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DecodeStats {
    /// Целых float32 значений в потоке
    pub values_scanned: u64,
    /// Записей, прошедших разбиение
    pub records_framed: u64,
    /// Участков, отброшенных из-за потери синхронизации
    pub misframed_spans: u64,
    /// Значений в отброшенных участках
    pub misframed_values: u64,
    /// Значений в незавершённой последней записи
    pub trailing_values: u64,
    /// Байт в конце файла, не образующих float32
    pub trailing_bytes: u64,
    /// Строк, отброшенных из-за NaN/inf
    pub rows_non_finite: u64,
    /// Строк в итоговой таблице
    pub rows: u64,
}

/// Результат декодирования.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub table: Table,
    pub stats: DecodeStats,
}

/// Декодер для одной схемы. Не хранит состояния между вызовами.
#[derive(Debug, Clone, Copy)]
pub struct Decoder<'s> {
    schema: &'s Schema,
}

impl DecodeStats {
    /// Сколько значений потока не попало ни в одну строку.
    pub fn values_discarded(&self) -> u64 {
        self.misframed_values + self.trailing_values
    }

    fn absorb_resync(
        &mut self,
        resync: &ResyncStats,
    ) {
        self.records_framed = resync.records;
        self.misframed_spans = resync.misframed_spans;
        self.misframed_values = resync.misframed_values;
        self.trailing_values = resync.trailing_values;
    }
}

impl<'s> Decoder<'s> {
    pub fn new(schema: &'s Schema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &Schema {
        self.schema
    }

    /// Декодирует поток. Вход не изменяется, повторный вызов даёт тот же
    /// результат.
    pub fn decode<B: AsRef<[u8]>>(
        &self,
        stream: &RawStream<B>,
    ) -> Decoded {
        let schema = self.schema;
        let n_values = stream.len();

        let mut stats = DecodeStats {
            values_scanned: n_values as u64,
            trailing_bytes: stream.trailing_bytes() as u64,
            ..DecodeStats::default()
        };

        let capacity = n_values / schema.width().max(1);
        let mut table = Table::with_capacity(schema, capacity);

        match schema.framing() {
            Framing::Framed { width, sentinel } => {
                let mut resync = Resynchronizer::new(stream.values(), width, sentinel);

                for span in resync.by_ref() {
                    self.push_row(&mut table, &mut stats, stream, span);
                }

                stats.absorb_resync(resync.stats());
            }
            Framing::Aligned { width } => {
                for span in aligned_spans(n_values, width) {
                    stats.records_framed += 1;
                    self.push_row(&mut table, &mut stats, stream, span);
                }

                stats.trailing_values = (n_values - stats.records_framed as usize * width) as u64;
            }
        }

        stats.rows = table.n_rows() as u64;

        debug!(
            "{}: {} values -> {} rows (misframed spans={}, trailing values={}, non-finite rows={})",
            schema.kind(),
            stats.values_scanned,
            stats.rows,
            stats.misframed_spans,
            stats.trailing_values,
            stats.rows_non_finite,
        );

        Decoded { table, stats }
    }

    fn push_row<B: AsRef<[u8]>>(
        &self,
        table: &mut Table,
        stats: &mut DecodeStats,
        stream: &RawStream<B>,
        span: RecordSpan,
    ) {
        let schema = self.schema;

        if schema.drop_non_finite()
            && !(0..span.len).all(|i| stream.value(span.start + i).is_finite())
        {
            stats.rows_non_finite += 1;
            return;
        }

        for (col, field) in schema.fields().iter().enumerate() {
            let raw = stream.value(span.start + col);
            match decode_field(field, raw) {
                FieldValue::Int(v) => table.push_i64(col, v),
                FieldValue::Float32(v) => table.push_f32(col, v),
                FieldValue::Float64(v) => table.push_f64(col, v),
            }
        }

        table.commit_row();
    }
}

enum FieldValue {
    Int(i64),
    Float32(f32),
    Float64(f64),
}

/// Приведение к целому: отбрасывание дробной части. Значения в потоке и так
/// целые; NaN даёт 0, выход за диапазон насыщается.
pub fn coerce_integer(raw: f32) -> i64 {
    raw as i64
}

fn decode_field(
    field: &FieldSpec,
    raw: f32,
) -> FieldValue {
    match (field.coercion, field.unit) {
        (Coercion::Integer, Unit::Raw) => FieldValue::Int(coerce_integer(raw)),
        (Coercion::Float, Unit::Raw) => FieldValue::Float32(raw),
        // Сначала целые миллисекунды, затем секунды.
        (Coercion::Integer, Unit::MillisToSeconds) => {
            FieldValue::Float64(coerce_integer(raw) as f64 / 1e3)
        }
        (Coercion::Float, Unit::MillisToSeconds) => FieldValue::Float64(raw as f64 / 1e3),
    }
}

/// Декодирует байтовый буфер по схеме.
pub fn decode_bytes(
    bytes: &[u8],
    schema: &Schema,
) -> Decoded {
    Decoder::new(schema).decode(&RawStream::new(bytes))
}

/// Читает файл захвата целиком и декодирует его.
pub fn decode_file<P: AsRef<Path>>(
    path: P,
    schema: &Schema,
) -> FprintResult<Decoded> {
    let stream = RawStream::open(path)?;
    Ok(Decoder::new(schema).decode(&stream))
}
