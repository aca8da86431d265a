use std::{
    fs, io,
    path::{Path, PathBuf},
};

use fprint_core::Coordinate;
use fprint_types::RecordKind;
use log::{debug, info};

use crate::{CleanerError, CleanerResult, Layout};

/// Имя файла, который приёмник пишет для данного типа записей: `ce.txt` и т.д.
pub fn capture_file_name(kind: RecordKind) -> String {
    format!("{kind}.txt")
}

/// Переносит свежий захват (`ce.txt`, `else.txt`, `info.txt`) из `src` в
/// раскладку под новым ID и записывает координаты в `locations.json`.
///
/// Наличие всех трёх файлов проверяется до первого переноса, так что при
/// отсутствии любого из них раскладка не меняется.
pub fn ingest_fingerprint(
    src: &Path,
    layout: &Layout,
    coordinate: Coordinate,
) -> CleanerResult<u32> {
    layout.ensure()?;

    let mut locations = layout.load_locations()?;
    let id = locations.next_id()?;

    let moves: Vec<(PathBuf, PathBuf)> = RecordKind::ALL
        .iter()
        .map(|&kind| (src.join(capture_file_name(kind)), layout.raw_path(kind, id)))
        .collect();

    if let Some((missing, _)) = moves.iter().find(|(from, _)| !from.is_file()) {
        return Err(CleanerError::MissingCapture(missing.clone()));
    }

    for (from, to) in &moves {
        move_file(from, to)?;
        debug!("Moved {} -> {}", from.display(), to.display());
    }

    locations.insert(id, coordinate);
    locations.save(layout.locations_path())?;

    info!(
        "Fingerprint {id} at ({}, {}) stored in {}",
        coordinate[0],
        coordinate[1],
        layout.root().display()
    );

    Ok(id)
}

/// Сдвигает все координаты в `locations.json` на (dx, dy).
pub fn offset_locations(
    layout: &Layout,
    dx: f64,
    dy: f64,
) -> CleanerResult<usize> {
    let mut locations = layout.load_locations()?;
    locations.offset(dx, dy);
    locations.save(layout.locations_path())?;

    info!(
        "Offset {} location(s) by ({dx}, {dy}) in {}",
        locations.len(),
        layout.locations_path().display()
    );

    Ok(locations.len())
}

/// `rename`, а если он не удался (например, другая файловая система),
/// копирование и удаление источника.
fn move_file(
    from: &Path,
    to: &Path,
) -> io::Result<()> {
    if let Err(e) = fs::rename(from, to) {
        debug!("rename {} failed ({e}), falling back to copy", from.display());
        fs::copy(from, to)?;
        fs::remove_file(from)?;
    }

    Ok(())
}
