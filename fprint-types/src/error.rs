use thiserror::Error;

/// Результат для операций fprint.
pub type FprintResult<T> = std::result::Result<T, FprintError>;

/// Типы ошибок декодера и формата таблиц.
#[derive(Debug, Error)]
pub enum FprintError {
    /// Неправильное магическое число
    #[error("Invalid magic: {0}")]
    InvalidMagic(String),

    /// Несовместимая версия формата
    #[error("Unsupported version: found {found}, expected {expected}")]
    UnsupportedVersion { found: u8, expected: u8 },

    /// Несовпадение CRC32 (ожидалось/найдено)
    #[error("CRC mismatch: expected {expected:08x}, found {found:08x}")]
    CrcMismatch { expected: u32, found: u32 },

    /// Повреждённые или некорректные данные
    #[error("Corrupted data: {0}")]
    Corrupted(String),

    /// Схема записи не проходит проверку
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    /// Неизвестный тип записи (ввод пользователя или байт в файле)
    #[error("Unknown record kind: {0}")]
    UnknownKind(String),

    /// Ошибка (де)сериализации JSON
    #[error("JSON error: {0}")]
    Json(String),

    /// Ошибки ввода/вывода (автоконвертируются из std::io::Error)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FprintError {
    /// Удобные конструкторы
    pub fn invalid_magic<S: Into<String>>(s: S) -> Self {
        Self::InvalidMagic(s.into())
    }

    pub fn corrupted<S: Into<String>>(s: S) -> Self {
        Self::Corrupted(s.into())
    }

    pub fn invalid_schema<S: Into<String>>(s: S) -> Self {
        Self::InvalidSchema(s.into())
    }

    pub fn json<S: Into<String>>(s: S) -> Self {
        Self::Json(s.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "ce_7_raw.txt");
        let err: FprintError = io.into();

        assert!(matches!(err, FprintError::Io(_)));
        assert!(err.to_string().contains("ce_7_raw.txt"));
    }

    #[test]
    fn test_crc_mismatch_display() {
        let err = FprintError::CrcMismatch {
            expected: 0xDEADBEEF,
            found: 0x0000_0001,
        };

        assert_eq!(err.to_string(), "CRC mismatch: expected deadbeef, found 00000001");
    }
}
