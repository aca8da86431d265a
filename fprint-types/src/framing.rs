/// Способ разбиения потока float32 на записи.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Framing {
    /// Записи завершаются STOP-символом; границы восстанавливаются
    /// ресинхронизатором. `width` включает колонку STOP.
    Framed { width: usize, sentinel: f32 },
    /// Поток считается выровненным: каждые `width` значений образуют одну запись.
    Aligned { width: usize },
}

impl Framing {
    /// Полная ширина записи в потоке (вместе с STOP, если он есть).
    pub fn width(&self) -> usize {
        match *self {
            Framing::Framed { width, .. } => width,
            Framing::Aligned { width } => width,
        }
    }

    /// Сколько значений попадает в декодированную строку.
    pub fn record_len(&self) -> usize {
        match *self {
            Framing::Framed { width, .. } => width.saturating_sub(1),
            Framing::Aligned { width } => width,
        }
    }

    pub fn sentinel(&self) -> Option<f32> {
        match *self {
            Framing::Framed { sentinel, .. } => Some(sentinel),
            Framing::Aligned { .. } => None,
        }
    }

    pub fn is_framed(&self) -> bool {
        matches!(self, Framing::Framed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_framed_record_len_drops_sentinel() {
        let f = Framing::Framed {
            width: 11,
            sentinel: 123.0,
        };

        assert_eq!(f.width(), 11);
        assert_eq!(f.record_len(), 10);
        assert_eq!(f.sentinel(), Some(123.0));
        assert!(f.is_framed());
    }

    #[test]
    fn test_aligned_record_len_is_width() {
        let f = Framing::Aligned { width: 5 };

        assert_eq!(f.width(), 5);
        assert_eq!(f.record_len(), 5);
        assert_eq!(f.sentinel(), None);
        assert!(!f.is_framed());
    }
}
