//! Раскладка папки с отпечатками.
//!
//! ```text
//! root/
//!     ce/    ce_<id>_raw.txt    ce_<id>.<ext>
//!     else/  else_<id>_raw.txt  else_<id>.<ext>
//!     info/  info_<id>_raw.txt  info_<id>.<ext>
//!     locations.json
//! ```

use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
};

use fprint_core::{Locations, OutputFormat};
use fprint_types::RecordKind;
use log::info;

use crate::CleanerResult;

/// Имя файла с координатами отпечатков.
pub const LOCATIONS_FILENAME: &str = "locations.json";

/// Суффикс сырых файлов в раскладке.
pub const RAW_SUFFIX: &str = "_raw.txt";

/// Пути внутри корня раскладки.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn kind_dir(
        &self,
        kind: RecordKind,
    ) -> PathBuf {
        self.root.join(kind.name())
    }

    /// `root/<kind>/<kind>_<id>_raw.txt`
    pub fn raw_path(
        &self,
        kind: RecordKind,
        id: u32,
    ) -> PathBuf {
        self.kind_dir(kind).join(format!("{kind}_{id}{RAW_SUFFIX}"))
    }

    /// `root/<kind>/<kind>_<id>.<ext>`
    pub fn clean_path(
        &self,
        kind: RecordKind,
        id: u32,
        format: OutputFormat,
    ) -> PathBuf {
        self.kind_dir(kind)
            .join(format!("{kind}_{id}.{}", format.extension()))
    }

    pub fn locations_path(&self) -> PathBuf {
        self.root.join(LOCATIONS_FILENAME)
    }

    pub fn load_locations(&self) -> CleanerResult<Locations> {
        Ok(Locations::load(self.locations_path())?)
    }

    /// Создаёт недостающие папки и пустой `locations.json`.
    pub fn ensure(&self) -> CleanerResult<()> {
        fs::create_dir_all(&self.root)?;

        for kind in RecordKind::ALL {
            let dir = self.kind_dir(kind);
            if !dir.is_dir() {
                fs::create_dir_all(&dir)?;
                info!("Created {}", dir.display());
            }
        }

        let locations = self.locations_path();
        if !locations.is_file() {
            Locations::new().save(&locations)?;
            info!("Created {}", locations.display());
        }

        Ok(())
    }

    /// ID отпечатков, для которых есть очищенные таблицы всех трёх типов.
    pub fn cleaned_ids(
        &self,
        format: OutputFormat,
    ) -> CleanerResult<BTreeSet<u32>> {
        let mut result: Option<BTreeSet<u32>> = None;

        for kind in RecordKind::ALL {
            let ids = self.clean_ids_of_kind(kind, format)?;
            result = Some(match result {
                None => ids,
                Some(acc) => acc.intersection(&ids).copied().collect(),
            });
        }

        Ok(result.unwrap_or_default())
    }

    /// ID очищенных таблиц одного типа (по именам файлов).
    pub fn clean_ids_of_kind(
        &self,
        kind: RecordKind,
        format: OutputFormat,
    ) -> CleanerResult<BTreeSet<u32>> {
        let dir = self.kind_dir(kind);
        let mut ids = BTreeSet::new();

        if !dir.is_dir() {
            return Ok(ids);
        }

        for entry in fs::read_dir(&dir)? {
            let name = entry?.file_name();
            if let Some(id) = name.to_str().and_then(|n| parse_clean_name(kind, format, n)) {
                ids.insert(id);
            }
        }

        Ok(ids)
    }
}

/// Извлекает ID из имени `<kind>_<id>.<ext>`.
pub fn parse_clean_name(
    kind: RecordKind,
    format: OutputFormat,
    file_name: &str,
) -> Option<u32> {
    file_name
        .strip_prefix(kind.name())?
        .strip_prefix('_')?
        .strip_suffix(format.extension())?
        .strip_suffix('.')?
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_paths() {
        let l = Layout::new("dev");

        assert_eq!(
            l.raw_path(RecordKind::ChannelEstimate, 7),
            PathBuf::from("dev/ce/ce_7_raw.txt")
        );
        assert_eq!(
            l.clean_path(RecordKind::Auxiliary, 7, OutputFormat::Fpt),
            PathBuf::from("dev/else/else_7.fpt")
        );
        assert_eq!(l.locations_path(), PathBuf::from("dev/locations.json"));
    }

    #[test]
    fn test_parse_clean_name() {
        let ce = RecordKind::ChannelEstimate;

        assert_eq!(parse_clean_name(ce, OutputFormat::Fpt, "ce_12.fpt"), Some(12));
        assert_eq!(parse_clean_name(ce, OutputFormat::Fpt, "ce_12_raw.txt"), None);
        assert_eq!(parse_clean_name(ce, OutputFormat::Fpt, "ce_12.json"), None);
        assert_eq!(parse_clean_name(ce, OutputFormat::Fpt, "else_12.fpt"), None);
        assert_eq!(parse_clean_name(ce, OutputFormat::Fpt, "ce_x.fpt"), None);
        assert_eq!(
            parse_clean_name(RecordKind::Info, OutputFormat::Csv, "info_0.csv"),
            Some(0)
        );
    }

    #[test]
    fn test_ensure_creates_structure() {
        let dir = tempdir().unwrap();
        let l = Layout::new(dir.path().join("dev"));

        l.ensure().unwrap();
        l.ensure().unwrap(); // повторный вызов ничего не ломает

        for kind in RecordKind::ALL {
            assert!(l.kind_dir(kind).is_dir());
        }
        assert!(l.load_locations().unwrap().is_empty());
    }

    #[test]
    fn test_cleaned_ids_requires_all_three() {
        let dir = tempdir().unwrap();
        let l = Layout::new(dir.path());
        l.ensure().unwrap();

        for kind in RecordKind::ALL {
            fs::write(l.clean_path(kind, 1, OutputFormat::Fpt), b"").unwrap();
        }
        fs::write(l.clean_path(RecordKind::ChannelEstimate, 2, OutputFormat::Fpt), b"").unwrap();
        fs::write(l.raw_path(RecordKind::ChannelEstimate, 3), b"").unwrap();

        let ids = l.cleaned_ids(OutputFormat::Fpt).unwrap();

        assert_eq!(ids.into_iter().collect::<Vec<_>>(), vec![1]);
        assert!(l.cleaned_ids(OutputFormat::Json).unwrap().is_empty());
    }
}
