use crate::{FprintError, FprintResult};

/// Тип записи, которую пишет приёмник.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum RecordKind {
    /// Оценка канала (CE) по поднесущим, с STOP-символом в конце записи
    ChannelEstimate = 0,
    /// Вспомогательные метрики (шум, SNR, RSRP, RSRQ, RSSI, CFO)
    Auxiliary = 1,
    /// Информация о соте (PCI, PRB, порты, антенны)
    Info = 2,
}

impl RecordKind {
    /// Все типы записей в порядке, в котором они образуют отпечаток.
    pub const ALL: [RecordKind; 3] = [
        RecordKind::ChannelEstimate,
        RecordKind::Auxiliary,
        RecordKind::Info,
    ];

    pub fn from_u8(v: u8) -> FprintResult<Self> {
        match v {
            0 => Ok(RecordKind::ChannelEstimate),
            1 => Ok(RecordKind::Auxiliary),
            2 => Ok(RecordKind::Info),
            _ => Err(FprintError::UnknownKind(format!("kind byte {v}"))),
        }
    }

    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    /// Короткое имя: используется в именах файлов и папок (`ce`, `else`,
    /// `info`).
    pub fn name(&self) -> &'static str {
        match self {
            RecordKind::ChannelEstimate => "ce",
            RecordKind::Auxiliary => "else",
            RecordKind::Info => "info",
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for RecordKind {
    type Err = FprintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ce" | "channel-estimate" => Ok(RecordKind::ChannelEstimate),
            "else" | "aux" | "auxiliary" => Ok(RecordKind::Auxiliary),
            "info" => Ok(RecordKind::Info),
            _ => Err(FprintError::UnknownKind(format!(
                "'{s}'. Use: ce, else, info"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_fromstr() {
        assert_eq!("ce".parse::<RecordKind>().unwrap(), RecordKind::ChannelEstimate);
        assert_eq!("ELSE".parse::<RecordKind>().unwrap(), RecordKind::Auxiliary);
        assert_eq!("aux".parse::<RecordKind>().unwrap(), RecordKind::Auxiliary);
        assert_eq!("info".parse::<RecordKind>().unwrap(), RecordKind::Info);
        assert!("iq".parse::<RecordKind>().is_err());
    }

    #[test]
    fn test_kind_u8_round_trip() {
        for kind in RecordKind::ALL {
            assert_eq!(RecordKind::from_u8(kind.as_u8()).unwrap(), kind);
        }
        assert!(RecordKind::from_u8(7).is_err());
    }

    #[test]
    fn test_kind_display_matches_file_prefix() {
        assert_eq!(RecordKind::ChannelEstimate.to_string(), "ce");
        assert_eq!(RecordKind::Auxiliary.to_string(), "else");
        assert_eq!(RecordKind::Info.to_string(), "info");
    }
}
