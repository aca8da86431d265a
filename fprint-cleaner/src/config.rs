use std::path::PathBuf;

use fprint_core::OutputFormat;
use fprint_types::SchemaRegistry;

use crate::{CleanerError, CleanerResult};

/// Полная конфигурация пакетной очистки.
#[derive(Debug, Clone)]
pub struct CleanerConfig {
    /// Корень раскладки (папки ce/, else/, info/ и locations.json)
    pub root: PathBuf,
    /// Формат выходных таблиц
    pub output_format: OutputFormat,
    /// Сжимать тело `.fpt` через LZ4
    pub compress: bool,
    /// Перечищать отпечатки, у которых уже есть все три таблицы
    pub force: bool,
    /// Количество потоков-декодеров
    pub workers: usize,
    /// Ёмкость очереди заданий
    pub queue_capacity: usize,
    /// Схемы записей
    pub registry: SchemaRegistry,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl CleanerConfig {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> CleanerResult<()> {
        if self.workers == 0 {
            return Err(CleanerError::Config("workers must be > 0".to_string()));
        }
        if self.queue_capacity == 0 {
            return Err(CleanerError::Config("queue capacity must be > 0".to_string()));
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для CleanerConfig
////////////////////////////////////////////////////////////////////////////////

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            output_format: OutputFormat::Fpt,
            compress: true,
            force: false,
            workers: default_workers(),
            queue_capacity: 64,
            registry: SchemaRegistry::standard(),
        }
    }
}

/// Число потоков по умолчанию: по числу ядер, минимум 1.
pub fn default_workers() -> usize {
    std::thread::available_parallelism().map_or(1, |n| n.get())
}

/// Парсит число потоков: целое > 0 или `auto`.
///
/// # Примеры
/// ```
/// use fprint_cleaner::config::parse_workers;
/// assert_eq!(parse_workers("4").unwrap(), 4);
/// assert!(parse_workers("auto").unwrap() >= 1);
/// assert!(parse_workers("0").is_err());
/// ```
pub fn parse_workers(s: &str) -> Result<usize, String> {
    let s = s.trim();

    if s.eq_ignore_ascii_case("auto") {
        return Ok(default_workers());
    }

    match s.parse::<usize>() {
        Ok(0) => Err("worker count must be > 0".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(format!("Invalid worker count '{s}': {e}")),
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
