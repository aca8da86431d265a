use std::path::PathBuf;

use thiserror::Error;

pub type CleanerResult<T> = std::result::Result<T, CleanerError>;

#[derive(Debug, Error)]
pub enum CleanerError {
    /// Нет сырого файла захвата
    #[error("Capture file not found: {}", .0.display())]
    MissingCapture(PathBuf),

    /// Очищенная таблица есть, а координат для неё в `locations.json` нет
    #[error("No location for fingerprint {id} in {}", .folder.display())]
    MissingLocation { id: u32, folder: PathBuf },

    /// Ошибка файловой системы
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Ошибка декодера или формата таблиц
    #[error("Decode error: {0}")]
    Fprint(#[from] fprint_types::FprintError),

    /// Некорректная конфигурация
    #[error("Config error: {0}")]
    Config(String),
}
