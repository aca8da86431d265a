/// Как трактовать сырое float32 значение поля.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    /// Оставить как float32
    Float,
    /// Целое (TTI, SC_ID, PCI, ...), хранится во float32
    Integer,
}

/// Перевод единиц после приведения типа.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    /// Без преобразования
    Raw,
    /// Миллисекунды -> секунды (÷1000)
    MillisToSeconds,
}

/// Тип колонки в декодированной таблице.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DType {
    Int64 = 0,
    Float32 = 1,
    Float64 = 2,
}

/// Описание одного поля записи.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub coercion: Coercion,
    pub unit: Unit,
}

impl DType {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(DType::Int64),
            1 => Some(DType::Float32),
            2 => Some(DType::Float64),
            _ => None,
        }
    }

    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    /// Размер одного значения в байтах.
    pub fn size(&self) -> usize {
        match self {
            DType::Int64 => 8,
            DType::Float32 => 4,
            DType::Float64 => 8,
        }
    }
}

impl FieldSpec {
    pub fn float<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            coercion: Coercion::Float,
            unit: Unit::Raw,
        }
    }

    pub fn integer<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            coercion: Coercion::Integer,
            unit: Unit::Raw,
        }
    }

    pub fn with_unit(
        mut self,
        unit: Unit,
    ) -> Self {
        self.unit = unit;
        self
    }

    /// Тип колонки, в которую попадёт поле после декодирования.
    pub fn dtype(&self) -> DType {
        match (self.coercion, self.unit) {
            (Coercion::Integer, Unit::Raw) => DType::Int64,
            (Coercion::Float, Unit::Raw) => DType::Float32,
            (_, Unit::MillisToSeconds) => DType::Float64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_dtype() {
        assert_eq!(FieldSpec::integer("TTI").dtype(), DType::Int64);
        assert_eq!(FieldSpec::float("CFO").dtype(), DType::Float32);
        assert_eq!(
            FieldSpec::integer("TTI")
                .with_unit(Unit::MillisToSeconds)
                .dtype(),
            DType::Float64
        );
    }

    #[test]
    fn test_dtype_u8_round_trip() {
        for d in [DType::Int64, DType::Float32, DType::Float64] {
            assert_eq!(DType::from_u8(d.as_u8()), Some(d));
        }
        assert_eq!(DType::from_u8(9), None);
    }
}
