//! Сырой поток float32 значений.
//!
//! Байты захвата читаются целиком в один буфер; ресинхронизатор и декодер
//! обращаются к значениям по индексу, не копируя записи.

use std::path::Path;

use byteorder::{ByteOrder, LittleEndian};

use crate::error::FprintResult;

/// Размер одного значения в потоке (float32).
pub const VALUE_SIZE: usize = 4;

/// Неизменяемое представление захвата как последовательности float32 LE.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawStream<B = Vec<u8>> {
    bytes: B,
}

impl RawStream<Vec<u8>> {
    /// Читает файл захвата целиком.
    pub fn open<P: AsRef<Path>>(path: P) -> FprintResult<Self> {
        let bytes = std::fs::read(path)?;
        Ok(Self { bytes })
    }

    /// Кодирует значения в little-endian поток.
    pub fn from_values(values: &[f32]) -> Self {
        let mut bytes = vec![0u8; values.len() * VALUE_SIZE];
        LittleEndian::write_f32_into(values, &mut bytes);
        Self { bytes }
    }
}

impl<B: AsRef<[u8]>> RawStream<B> {
    pub fn new(bytes: B) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.bytes.as_ref()
    }

    /// Количество целых float32 значений.
    pub fn len(&self) -> usize {
        self.as_bytes().len() / VALUE_SIZE
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Байты в конце, не образующие целого значения (обрыв записи).
    pub fn trailing_bytes(&self) -> usize {
        self.as_bytes().len() % VALUE_SIZE
    }

    /// Значение по индексу.
    ///
    /// # Panics
    /// Если `index >= len()`.
    pub fn value(
        &self,
        index: usize,
    ) -> f32 {
        let off = index * VALUE_SIZE;
        LittleEndian::read_f32(&self.as_bytes()[off..off + VALUE_SIZE])
    }

    pub fn get(
        &self,
        index: usize,
    ) -> Option<f32> {
        (index < self.len()).then(|| self.value(index))
    }

    pub fn values(&self) -> impl Iterator<Item = f32> + '_ {
        self.as_bytes()
            .chunks_exact(VALUE_SIZE)
            .map(LittleEndian::read_f32)
    }

    pub fn into_inner(self) -> B {
        self.bytes
    }
}
