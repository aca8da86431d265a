use std::{
    fs,
    path::{Path, PathBuf},
};

use fprint_core::{publish_atomic, Locations, OutputFormat};
use fprint_types::RecordKind;
use log::info;

use crate::{CleanerError, CleanerResult, Layout};

/// Итог объединения папок.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CombineSummary {
    pub folders: usize,
    pub fingerprints: usize,
}

/// Подпапки `parent`, упорядоченные по имени.
pub fn list_source_folders(parent: &Path) -> CleanerResult<Vec<PathBuf>> {
    let mut folders = Vec::new();

    for entry in fs::read_dir(parent)? {
        let path = entry?.path();
        if path.is_dir() {
            folders.push(path);
        }
    }

    folders.sort();
    Ok(folders)
}

/// Объединяет очищенные CE-таблицы нескольких раскладок в одну.
///
/// Таблицы каждой папки берутся по возрастанию ID и получают новые ID
/// подряд с нуля. Каждый файл копируется через временный файл и rename.
/// `locations.json` назначения переписывается целиком.
pub fn combine_folders(
    sources: &[PathBuf],
    dest: &Layout,
    format: OutputFormat,
) -> CleanerResult<CombineSummary> {
    dest.ensure()?;

    let kind = RecordKind::ChannelEstimate;
    let mut merged = Locations::new();
    let mut next_id: u32 = 0;

    for folder in sources {
        let src = Layout::new(folder.clone());
        let locations = src.load_locations()?;
        let ids = src.clean_ids_of_kind(kind, format)?;

        info!(
            "{}: {} location(s), {} {} table(s)",
            folder.display(),
            locations.len(),
            ids.len(),
            kind
        );

        for id in ids {
            let coordinate = locations
                .get(id)
                .ok_or_else(|| CleanerError::MissingLocation {
                    id,
                    folder: folder.clone(),
                })?;

            let bytes = fs::read(src.clean_path(kind, id, format))?;
            publish_atomic(dest.clean_path(kind, next_id, format), &bytes)?;

            merged.insert(next_id, coordinate);
            next_id = next_id
                .checked_add(1)
                .ok_or_else(|| CleanerError::Config("fingerprint id space exhausted".to_string()))?;
        }
    }

    merged.save(dest.locations_path())?;

    info!(
        "Combined {} folder(s) into {} ({} fingerprint(s))",
        sources.len(),
        dest.root().display(),
        merged.len()
    );

    Ok(CombineSummary {
        folders: sources.len(),
        fingerprints: merged.len(),
    })
}
