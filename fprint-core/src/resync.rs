//! Восстановление границ записей по STOP-символу.
//!
//! Процесс записи может быть убит посреди записи или начать дамп не с
//! начала записи, поэтому поток CE не обязан быть выровнен. Единственный
//! структурный маркер: STOP-символ в последней колонке. Запись принимается,
//! только если STOP пришёл ровно в колонке `width`; всё остальное между двумя
//! STOP-символами отбрасывается целиком.
//!
//! Значение данных, случайно равное STOP-символу, неотличимо от маркера и
//! приводит к потере окружающих записей. Это известное ограничение формата.

use fprint_types::Framing;
use log::trace;

/// Положение записи в потоке: индекс первого значения и число значений.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordSpan {
    pub start: usize,
    pub len: usize,
}

/// Статистика одного прохода ресинхронизации.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ResyncStats {
    /// Всего просмотрено значений
    pub values_scanned: u64,
    /// Принятых записей
    pub records: u64,
    /// Участков, где STOP пришёл не в своей колонке
    pub misframed_spans: u64,
    /// Значений в отброшенных участках (включая их STOP)
    pub misframed_values: u64,
    /// Значений после последнего STOP (незавершённая запись)
    pub trailing_values: u64,
}

/// Однопроходный ресинхронизатор: итератор по корректно обрамлённым
/// записям.
///
/// Состояние: счётчик колонки и индекс начала текущей записи-кандидата,
/// значения не копируются.
pub struct Resynchronizer<I> {
    values: I,
    width: usize,
    sentinel: f32,
    position: usize,
    start: usize,
    column: usize,
    stats: ResyncStats,
    finished: bool,
}

impl RecordSpan {
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    /// Значения записи из плоского среза.
    pub fn slice<'a>(
        &self,
        values: &'a [f32],
    ) -> &'a [f32] {
        &values[self.start..self.end()]
    }
}

impl<I: Iterator<Item = f32>> Resynchronizer<I> {
    /// `width`: полная ширина записи вместе со STOP.
    ///
    /// # Panics
    /// Если `width < 2`: запись без полей данных не имеет смысла.
    pub fn new(
        values: I,
        width: usize,
        sentinel: f32,
    ) -> Self {
        assert!(width >= 2, "framed width must be >= 2, got {width}");

        Self {
            values,
            width,
            sentinel,
            position: 0,
            start: 0,
            column: 0,
            stats: ResyncStats::default(),
            finished: false,
        }
    }

    /// Ресинхронизатор для `Framing::Framed`; `None` для выровненных схем.
    pub fn for_framing(
        values: I,
        framing: &Framing,
    ) -> Option<Self> {
        match *framing {
            Framing::Framed { width, sentinel } => Some(Self::new(values, width, sentinel)),
            Framing::Aligned { .. } => None,
        }
    }

    pub fn stats(&self) -> &ResyncStats {
        &self.stats
    }

    /// Текущая колонка (0: ожидается начало записи).
    pub fn column(&self) -> usize {
        self.column
    }
}

impl<I: Iterator<Item = f32>> Iterator for Resynchronizer<I> {
    type Item = RecordSpan;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        for v in self.values.by_ref() {
            self.position += 1;
            self.column += 1;
            self.stats.values_scanned += 1;

            if v != self.sentinel {
                continue;
            }

            let start = self.start;
            let column = self.column;

            self.start = self.position;
            self.column = 0;

            if column == self.width {
                self.stats.records += 1;
                return Some(RecordSpan {
                    start,
                    len: self.width - 1,
                });
            }

            self.stats.misframed_spans += 1;
            self.stats.misframed_values += column as u64;
            trace!(
                "misframed span at value {start}: STOP in column {column}, expected {}",
                self.width
            );
        }

        self.finished = true;
        self.stats.trailing_values = self.column as u64;

        if self.column > 0 {
            trace!(
                "dropping {} trailing values after last STOP at value {}",
                self.column,
                self.start
            );
        }

        None
    }
}

/// Все корректно обрамлённые записи в срезе значений.
pub fn resync(
    values: &[f32],
    width: usize,
    sentinel: f32,
) -> (Vec<RecordSpan>, ResyncStats) {
    let mut resync = Resynchronizer::new(values.iter().copied(), width, sentinel);
    let spans = resync.by_ref().collect();

    (spans, resync.stats)
}

/// Записи выровненного потока: подряд идущие куски по `width` значений,
/// неполный хвост не возвращается.
pub fn aligned_spans(
    len: usize,
    width: usize,
) -> impl Iterator<Item = RecordSpan> {
    let count = if width == 0 { 0 } else { len / width };
    (0..count).map(move |i| RecordSpan {
        start: i * width,
        len: width,
    })
}
