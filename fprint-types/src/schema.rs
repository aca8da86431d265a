//! Схемы записей, которые пишет модифицированный UE-приёмник.
//!
//! Все поля float32 little-endian. CE-запись заканчивается STOP-символом
//! `123.0`, AUX и Info пишутся без разделителя.

use std::collections::HashSet;

use crate::{FieldSpec, Framing, FprintError, FprintResult, RecordKind, Unit};

/// STOP-символ в конце каждой CE-записи.
pub const STOP_SYMBOL: f32 = 123.0;

/// Ширина CE-записи в потоке (10 полей + STOP).
pub const CE_WIDTH: usize = 11;

/// Ширина AUX-записи (TTI + 20 метрик).
pub const AUX_WIDTH: usize = 21;

/// Ширина Info-записи.
pub const INFO_WIDTH: usize = 5;

/// Максимальная длина имени колонки (байт), ограничена форматом `.fpt`.
pub const MAX_FIELD_NAME_LEN: usize = u8::MAX as usize;

const CE_FIELDS: [&str; 10] = [
    "TTI",
    "SC_ID",
    "CE_0_AMPLITUDE",
    "CE_0_PHASE",
    "CE_1_AMPLITUDE",
    "CE_1_PHASE",
    "CE_2_AMPLITUDE",
    "CE_2_PHASE",
    "CE_3_AMPLITUDE",
    "CE_3_PHASE",
];

const AUX_FIELDS: [&str; AUX_WIDTH] = [
    "TTI",
    "NOISE_ESTIMATE_DBM",
    "SNR_DB",
    "SNR_DB_0",
    "SNR_DB_1",
    "SNR_DB_2",
    "SNR_DB_3",
    "RSRP_DBM",
    "RSRP_NEIGH",
    "RSRP_DBM_0",
    "RSRP_DBM_1",
    "RSRP_DBM_2",
    "RSRP_DBM_3",
    "RSRQ_DB",
    "RSRQ_DB_0",
    "RSRQ_DB_1",
    "RSRQ_DB_2",
    "RSRQ_DB_3",
    "RSSI_DBM",
    "CFO",
    "SYNC_ERROR",
];

const INFO_FIELDS: [&str; INFO_WIDTH] = ["PCI", "NOF_PRB", "NOF_PORTS", "NOF_RX_ANTENNAS", "TTI"];

/// Полное описание одного типа записи.
///
/// Создаётся только через `Schema::new` или стандартные конструкторы:
/// число полей всегда равно `record_len()`.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    kind: RecordKind,
    framing: Framing,
    /// Поля строки (без STOP) в порядке записи
    fields: Vec<FieldSpec>,
    /// Отбрасывать строки с NaN/inf после декодирования
    drop_non_finite: bool,
}

impl Schema {
    /// Создаёт пользовательскую схему с проверкой согласованности.
    pub fn new(
        kind: RecordKind,
        framing: Framing,
        fields: Vec<FieldSpec>,
        drop_non_finite: bool,
    ) -> FprintResult<Self> {
        let schema = Self {
            kind,
            framing,
            fields,
            drop_non_finite,
        };

        schema.validate()?;

        Ok(schema)
    }

    /// CE: TTI, SC_ID и 4 пары (амплитуда, фаза), затем STOP.
    pub fn channel_estimate() -> Self {
        let fields = CE_FIELDS
            .iter()
            .map(|&name| match name {
                "TTI" | "SC_ID" => FieldSpec::integer(name),
                _ => FieldSpec::float(name),
            })
            .collect();

        Self {
            kind: RecordKind::ChannelEstimate,
            framing: Framing::Framed {
                width: CE_WIDTH,
                sentinel: STOP_SYMBOL,
            },
            fields,
            drop_non_finite: true,
        }
    }

    /// AUX: TTI в миллисекундах (переводится в секунды) и метрики сигнала.
    pub fn auxiliary() -> Self {
        let fields = AUX_FIELDS
            .iter()
            .map(|&name| match name {
                "TTI" => FieldSpec::integer(name).with_unit(Unit::MillisToSeconds),
                _ => FieldSpec::float(name),
            })
            .collect();

        Self {
            kind: RecordKind::Auxiliary,
            framing: Framing::Aligned { width: AUX_WIDTH },
            fields,
            drop_non_finite: false,
        }
    }

    /// Info: все поля целые.
    pub fn info() -> Self {
        Self {
            kind: RecordKind::Info,
            framing: Framing::Aligned { width: INFO_WIDTH },
            fields: INFO_FIELDS.iter().map(|&n| FieldSpec::integer(n)).collect(),
            drop_non_finite: false,
        }
    }

    /// Стандартная схема для типа записи.
    pub fn standard(kind: RecordKind) -> Self {
        match kind {
            RecordKind::ChannelEstimate => Self::channel_estimate(),
            RecordKind::Auxiliary => Self::auxiliary(),
            RecordKind::Info => Self::info(),
        }
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn framing(&self) -> Framing {
        self.framing
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn drop_non_finite(&self) -> bool {
        self.drop_non_finite
    }

    /// Полная ширина записи в потоке.
    pub fn width(&self) -> usize {
        self.framing.width()
    }

    /// Число значений в декодированной строке.
    pub fn record_len(&self) -> usize {
        self.framing.record_len()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Индекс поля по имени.
    pub fn position(
        &self,
        name: &str,
    ) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn validate(&self) -> FprintResult<()> {
        let width = self.framing.width();

        match self.framing {
            Framing::Framed { sentinel, .. } => {
                if width < 2 {
                    return Err(FprintError::invalid_schema(format!(
                        "framed width must be >= 2, got {width}"
                    )));
                }
                if !sentinel.is_finite() {
                    return Err(FprintError::invalid_schema("sentinel must be finite"));
                }
            }
            Framing::Aligned { .. } => {
                if width == 0 {
                    return Err(FprintError::invalid_schema("width must be > 0"));
                }
            }
        }

        if self.fields.len() != self.record_len() {
            return Err(FprintError::invalid_schema(format!(
                "{} fields declared, framing expects {}",
                self.fields.len(),
                self.record_len()
            )));
        }

        let mut seen = HashSet::new();

        for field in &self.fields {
            if field.name.is_empty() || field.name.len() > MAX_FIELD_NAME_LEN {
                return Err(FprintError::invalid_schema(format!(
                    "field name length {} out of range 1..={MAX_FIELD_NAME_LEN}",
                    field.name.len()
                )));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(FprintError::invalid_schema(format!(
                    "duplicate field '{}'",
                    field.name
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Coercion, DType};

    #[test]
    fn test_standard_schemas_are_valid() {
        for kind in RecordKind::ALL {
            let schema = Schema::standard(kind);
            assert_eq!(schema.kind, kind);
            schema.validate().unwrap();
        }
    }

    #[test]
    fn test_ce_layout() {
        let ce = Schema::channel_estimate();

        assert_eq!(ce.width(), 11);
        assert_eq!(ce.record_len(), 10);
        assert_eq!(ce.framing.sentinel(), Some(123.0));
        assert!(ce.drop_non_finite);
        assert_eq!(ce.fields[0].coercion, Coercion::Integer);
        assert_eq!(ce.fields[1].coercion, Coercion::Integer);
        assert!(ce.fields[2..].iter().all(|f| f.coercion == Coercion::Float));
        assert_eq!(ce.column_names().last(), Some("CE_3_PHASE"));
    }

    #[test]
    fn test_aux_tti_in_seconds() {
        let aux = Schema::auxiliary();
        let tti = &aux.fields[aux.position("TTI").unwrap()];

        assert_eq!(aux.width(), 21);
        assert!(aux.framing.sentinel().is_none());
        assert_eq!(tti.unit, Unit::MillisToSeconds);
        assert_eq!(tti.dtype(), DType::Float64);
        assert!(aux.fields[1..].iter().all(|f| f.unit == Unit::Raw));
    }

    #[test]
    fn test_info_all_integer() {
        let info = Schema::info();

        assert_eq!(info.width(), 5);
        assert!(info.fields.iter().all(|f| f.dtype() == DType::Int64));
        assert_eq!(info.position("TTI"), Some(4));
    }

    #[test]
    fn test_custom_schema_width_mismatch() {
        let result = Schema::new(
            RecordKind::ChannelEstimate,
            Framing::Framed {
                width: 4,
                sentinel: 99.0,
            },
            vec![FieldSpec::integer("TTI"), FieldSpec::float("A")],
            true,
        );

        assert!(matches!(result, Err(FprintError::InvalidSchema(_))));
    }

    #[test]
    fn test_custom_schema_duplicate_name() {
        let result = Schema::new(
            RecordKind::Info,
            Framing::Aligned { width: 2 },
            vec![FieldSpec::integer("PCI"), FieldSpec::integer("PCI")],
            false,
        );

        assert!(result.unwrap_err().to_string().contains("duplicate"));
    }

    #[test]
    fn test_custom_schema_rejects_nan_sentinel() {
        let result = Schema::new(
            RecordKind::ChannelEstimate,
            Framing::Framed {
                width: 2,
                sentinel: f32::NAN,
            },
            vec![FieldSpec::float("A")],
            true,
        );

        assert!(result.is_err());
    }

    #[test]
    fn test_custom_schema_more_fields_than_record() {
        let result = Schema::new(
            RecordKind::Info,
            Framing::Aligned { width: 2 },
            vec![
                FieldSpec::float("A"),
                FieldSpec::float("B"),
                FieldSpec::float("C"),
            ],
            false,
        );

        assert!(matches!(result, Err(FprintError::InvalidSchema(_))));
    }

    #[test]
    fn test_custom_schema_framed_width_too_small() {
        let result = Schema::new(
            RecordKind::ChannelEstimate,
            Framing::Framed {
                width: 1,
                sentinel: STOP_SYMBOL,
            },
            Vec::new(),
            true,
        );

        assert!(matches!(result, Err(FprintError::InvalidSchema(_))));
    }
}
