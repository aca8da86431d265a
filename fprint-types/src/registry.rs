use crate::{RecordKind, Schema};

/// Набор схем, передаваемый декодеру явно (без глобального состояния).
///
/// Разные реестры могут описывать разные версии формата приёмника и
/// использоваться одновременно.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaRegistry {
    schemas: Vec<Schema>,
}

impl SchemaRegistry {
    /// Пустой реестр.
    pub fn empty() -> Self {
        Self {
            schemas: Vec::new(),
        }
    }

    /// Реестр со стандартными CE, AUX и Info схемами.
    pub fn standard() -> Self {
        Self {
            schemas: RecordKind::ALL.iter().map(|&k| Schema::standard(k)).collect(),
        }
    }

    /// Добавляет схему, заменяя уже зарегистрированную для того же типа.
    pub fn with_schema(
        mut self,
        schema: Schema,
    ) -> Self {
        self.schemas.retain(|s| s.kind() != schema.kind());
        self.schemas.push(schema);
        self
    }

    pub fn try_get(
        &self,
        kind: RecordKind,
    ) -> Option<&Schema> {
        self.schemas.iter().find(|s| s.kind() == kind)
    }

    /// Схема для типа записи.
    ///
    /// # Panics
    /// Если схема для `kind` не зарегистрирована: это ошибка программы, а не
    /// входных данных.
    pub fn get(
        &self,
        kind: RecordKind,
    ) -> &Schema {
        match self.try_get(kind) {
            Some(schema) => schema,
            None => panic!("no schema registered for record kind '{kind}'"),
        }
    }

    pub fn kinds(&self) -> impl Iterator<Item = RecordKind> + '_ {
        self.schemas.iter().map(|s| s.kind())
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FieldSpec, Framing};

    #[test]
    fn test_standard_registry_lookup() {
        let registry = SchemaRegistry::standard();

        assert_eq!(registry.get(RecordKind::ChannelEstimate).width(), 11);
        assert_eq!(registry.get(RecordKind::Auxiliary).width(), 21);
        assert_eq!(registry.get(RecordKind::Info).width(), 5);
        assert_eq!(registry.kinds().count(), 3);
    }

    #[test]
    #[should_panic(expected = "no schema registered")]
    fn test_missing_kind_panics() {
        SchemaRegistry::empty().get(RecordKind::Info);
    }

    #[test]
    fn test_with_schema_replaces_kind() {
        let legacy_info = Schema::new(
            RecordKind::Info,
            Framing::Aligned { width: 2 },
            vec![FieldSpec::integer("PCI"), FieldSpec::integer("TTI")],
            false,
        )
        .unwrap();

        let registry = SchemaRegistry::standard().with_schema(legacy_info);

        assert_eq!(registry.get(RecordKind::Info).width(), 2);
        assert_eq!(registry.kinds().count(), 3);
        assert!(registry.try_get(RecordKind::ChannelEstimate).is_some());
    }
}
