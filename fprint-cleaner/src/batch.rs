use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
};

use fprint_core::{decode_file, Decoded, TableWriter};
use fprint_types::{RecordKind, SchemaRegistry};
use log::{debug, info, warn};

use crate::{CleanMetrics, CleanerConfig, CleanerError, CleanerResult, Layout};

/// Итог пакетной очистки.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// ID, переданные в работу
    pub planned: Vec<u32>,
    /// Уже очищенные ID (пропущены без `--force`)
    pub skipped: Vec<u32>,
    /// Успешно очищенные ID
    pub cleaned: Vec<u32>,
    /// Упавшие ID и причина
    pub failed: Vec<(u32, String)>,
    /// Прогон прерван флагом остановки
    pub stopped: bool,
}

/// Результат работы одного потока над одним отпечатком.
#[derive(Debug)]
struct JobResult {
    id: u32,
    result: CleanerResult<()>,
}

/// Пакетная очистка всех отпечатков из `locations.json`.
///
/// Очередь заданий (`crossbeam_channel::bounded`) раздаёт ID потокам-декодерам.
/// Каждый поток декодирует три файла отпечатка и публикует таблицы атомарно.
/// Ошибка одного отпечатка не останавливает остальные.
pub struct CleanBatch {
    config: CleanerConfig,
    layout: Layout,
    metrics: Arc<CleanMetrics>,
    stop_flag: Arc<AtomicBool>,
}

impl CleanBatch {
    /// Создаёт прогон. Возвращает также shared-ссылку на метрики.
    pub fn new(config: CleanerConfig) -> (Self, Arc<CleanMetrics>) {
        let metrics = CleanMetrics::new();
        let layout = Layout::new(config.root.clone());
        let batch = Self {
            config,
            layout,
            metrics: metrics.clone(),
            stop_flag: Arc::new(AtomicBool::new(false)),
        };

        (batch, metrics)
    }

    /// Флаг остановки. `true` прекращает выдачу новых заданий.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop_flag.clone()
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Разбивает ID из `locations.json` на (к очистке, пропущенные).
    pub fn plan(&self) -> CleanerResult<(Vec<u32>, Vec<u32>)> {
        let locations = self.layout.load_locations()?;

        if self.config.force {
            return Ok((locations.ids().collect(), Vec::new()));
        }

        let done = self.layout.cleaned_ids(self.config.output_format)?;

        Ok(locations.ids().partition(|id| !done.contains(id)))
    }

    /// Запускает очистку. Блокируется до завершения всех потоков.
    pub fn run(self) -> CleanerResult<BatchSummary> {
        self.config.validate()?;

        let (planned, skipped) = self.plan()?;

        self.metrics
            .fingerprints_skipped
            .fetch_add(skipped.len() as u64, Ordering::Relaxed);

        info!(
            "Cleaning {} fingerprint(s) in {:?} ({} already cleaned)",
            planned.len(),
            self.layout.root(),
            skipped.len()
        );

        let mut summary = BatchSummary {
            planned: planned.clone(),
            skipped,
            ..BatchSummary::default()
        };

        if planned.is_empty() {
            return Ok(summary);
        }

        let n_workers = self.config.workers.min(planned.len()).max(1);
        let writer = TableWriter::new(self.config.output_format).compressed(self.config.compress);

        let (job_tx, job_rx) = crossbeam_channel::bounded::<u32>(self.config.queue_capacity);
        let (res_tx, res_rx) = crossbeam_channel::unbounded::<JobResult>();

        thread::scope(|s| {
            for w in 0..n_workers {
                let job_rx = job_rx.clone();
                let res_tx = res_tx.clone();
                let layout = &self.layout;
                let registry = &self.config.registry;
                let metrics = &self.metrics;

                s.spawn(move || {
                    debug!("Worker {w} started");

                    for id in job_rx.iter() {
                        let result = clean_fingerprint(layout, registry, writer, id, metrics);

                        if res_tx.send(JobResult { id, result }).is_err() {
                            break;
                        }
                    }

                    debug!("Worker {w} finished");
                });
            }

            // Потоки держат свои клоны
            drop(job_rx);
            drop(res_tx);

            for &id in &planned {
                if self.stop_flag.load(Ordering::Relaxed) {
                    info!("Stop signal received. Waiting for in-flight fingerprints...");
                    summary.stopped = true;
                    break;
                }

                if job_tx.send(id).is_err() {
                    warn!("All workers exited early");
                    break;
                }
            }

            drop(job_tx);
        });

        for JobResult { id, result } in res_rx.try_iter() {
            match result {
                Ok(()) => {
                    self.metrics
                        .fingerprints_cleaned
                        .fetch_add(1, Ordering::Relaxed);
                    summary.cleaned.push(id);
                }
                Err(e) => {
                    self.metrics
                        .fingerprints_failed
                        .fetch_add(1, Ordering::Relaxed);
                    warn!("Fingerprint {id} skipped: {e}");
                    summary.failed.push((id, e.to_string()));
                }
            }
        }

        summary.cleaned.sort_unstable();
        summary.failed.sort_unstable_by_key(|(id, _)| *id);

        Ok(summary)
    }
}

/// Очищает один отпечаток: декодирует все три файла, затем публикует таблицы.
///
/// Пока хотя бы один файл не декодирован, на диск ничего не пишется.
pub fn clean_fingerprint(
    layout: &Layout,
    registry: &SchemaRegistry,
    writer: TableWriter,
    id: u32,
    metrics: &CleanMetrics,
) -> CleanerResult<()> {
    let mut decoded: Vec<(RecordKind, Decoded)> = Vec::with_capacity(RecordKind::ALL.len());

    for kind in RecordKind::ALL {
        let raw = layout.raw_path(kind, id);
        if !raw.is_file() {
            return Err(CleanerError::MissingCapture(raw));
        }

        let d = decode_file(&raw, registry.get(kind))?;

        if d.stats.misframed_spans > 0 {
            debug!(
                "{}: {} misframed span(s), {} value(s) discarded",
                raw.display(),
                d.stats.misframed_spans,
                d.stats.values_discarded()
            );
        }

        metrics.record_decode(&d.stats);
        decoded.push((kind, d));
    }

    for (kind, d) in &decoded {
        let path = layout.clean_path(*kind, id, writer.format());
        let bytes = writer.write(&path, &d.table)?;
        metrics.record_write(d.table.n_rows() as u64, bytes);
    }

    info!(
        "Fingerprint {id}: ce={} else={} info={} rows",
        decoded[0].1.table.n_rows(),
        decoded[1].1.table.n_rows(),
        decoded[2].1.table.n_rows()
    );

    Ok(())
}
