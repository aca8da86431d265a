use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Instant,
};

use fprint_core::DecodeStats;

/// Счётчики пакетной очистки, обновляются lock-free из потоков-декодеров.
#[derive(Debug, Default)]
pub struct CleanMetrics {
    pub fingerprints_cleaned: AtomicU64,
    pub fingerprints_skipped: AtomicU64,
    pub fingerprints_failed: AtomicU64,
    pub files_written: AtomicU64,
    pub bytes_read: AtomicU64,
    pub bytes_written: AtomicU64,
    pub rows_written: AtomicU64,
    pub misframed_spans: AtomicU64,
    pub values_discarded: AtomicU64,
    pub rows_non_finite: AtomicU64,
}

/// Snapshot метрик для вывода и тестов.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanSummary {
    pub duration_secs: f64,
    pub fingerprints_cleaned: u64,
    pub fingerprints_skipped: u64,
    pub fingerprints_failed: u64,
    pub files_written: u64,
    pub bytes_read: u64,
    pub bytes_written: u64,
    pub rows_written: u64,
    pub misframed_spans: u64,
    pub values_discarded: u64,
    pub rows_non_finite: u64,
    pub read_speed_mbps: f64,
}

impl CleanMetrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Учитывает статистику одного декодированного файла.
    pub fn record_decode(
        &self,
        stats: &DecodeStats,
    ) {
        self.bytes_read.fetch_add(
            stats.values_scanned * 4 + stats.trailing_bytes,
            Ordering::Relaxed,
        );
        self.misframed_spans
            .fetch_add(stats.misframed_spans, Ordering::Relaxed);
        self.values_discarded
            .fetch_add(stats.values_discarded(), Ordering::Relaxed);
        self.rows_non_finite
            .fetch_add(stats.rows_non_finite, Ordering::Relaxed);
    }

    /// Учитывает один опубликованный файл таблицы.
    pub fn record_write(
        &self,
        rows: u64,
        bytes: u64,
    ) {
        self.files_written.fetch_add(1, Ordering::Relaxed);
        self.rows_written.fetch_add(rows, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Скорость чтения сырых данных в МБ/с.
    pub fn read_speed_mbps(
        &self,
        elapsed: &Instant,
    ) -> f64 {
        let secs = elapsed.elapsed().as_secs_f64();

        if secs < 1e-9 {
            return 0.0;
        }

        self.bytes_read.load(Ordering::Relaxed) as f64 / secs / 1_000_000.0
    }

    /// Итоговая сводка для вывода в конце прогона.
    pub fn summary(
        &self,
        elapsed: &Instant,
    ) -> CleanSummary {
        CleanSummary {
            duration_secs: elapsed.elapsed().as_secs_f64(),
            fingerprints_cleaned: self.fingerprints_cleaned.load(Ordering::Relaxed),
            fingerprints_skipped: self.fingerprints_skipped.load(Ordering::Relaxed),
            fingerprints_failed: self.fingerprints_failed.load(Ordering::Relaxed),
            files_written: self.files_written.load(Ordering::Relaxed),
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            rows_written: self.rows_written.load(Ordering::Relaxed),
            misframed_spans: self.misframed_spans.load(Ordering::Relaxed),
            values_discarded: self.values_discarded.load(Ordering::Relaxed),
            rows_non_finite: self.rows_non_finite.load(Ordering::Relaxed),
            read_speed_mbps: self.read_speed_mbps(elapsed),
        }
    }
}

impl std::fmt::Display for CleanSummary {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        writeln!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        writeln!(f, "  Duration      : {:.1}s", self.duration_secs)?;
        writeln!(f, "  Cleaned       : {}", self.fingerprints_cleaned)?;
        writeln!(f, "  Skipped       : {}", self.fingerprints_skipped)?;
        writeln!(f, "  Failed        : {}", self.fingerprints_failed)?;
        writeln!(f, "  Files written : {}", self.files_written)?;
        writeln!(f, "  Rows written  : {}", self.rows_written)?;
        writeln!(f, "  Misframed     : {} spans", self.misframed_spans)?;
        writeln!(f, "  Discarded     : {} values", self.values_discarded)?;
        writeln!(f, "  Non-finite    : {} rows", self.rows_non_finite)?;
        writeln!(f, "  Bytes read    : {:.1} MB", self.bytes_read as f64 / 1e6)?;
        writeln!(
            f,
            "  Bytes written : {:.1} MB",
            self.bytes_written as f64 / 1e6
        )?;
        writeln!(f, "  Read speed    : {:.1} MB/s", self.read_speed_mbps)?;
        write!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")
    }
}
