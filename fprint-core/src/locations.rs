//! `locations.json`: соответствие ID отпечатка и координат точки записи.
//!
//! ```json
//! {"0": [0.0, 0.0], "1": [10.0, 0.0]}
//! ```

use std::{collections::BTreeMap, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    error::{FprintError, FprintResult},
    serialization::publish_atomic,
};

/// Координаты (x, y) точки записи.
pub type Coordinate = [f64; 2];

/// Таблица отпечатков: ID -> координаты. ID упорядочены численно.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locations {
    entries: BTreeMap<u32, Coordinate>,
}

impl Locations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load<P: AsRef<Path>>(path: P) -> FprintResult<Self> {
        let bytes = std::fs::read(path)?;
        serde_json::from_slice(&bytes).map_err(|e| FprintError::json(e.to_string()))
    }

    /// Атомарно сохраняет файл.
    pub fn save<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> FprintResult<()> {
        let bytes = serde_json::to_vec(self).map_err(|e| FprintError::json(e.to_string()))?;
        publish_atomic(path, &bytes)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(
        &self,
        id: u32,
    ) -> Option<Coordinate> {
        self.entries.get(&id).copied()
    }

    pub fn insert(
        &mut self,
        id: u32,
        coordinate: Coordinate,
    ) -> Option<Coordinate> {
        self.entries.insert(id, coordinate)
    }

    /// ID в порядке возрастания.
    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, Coordinate)> + '_ {
        self.entries.iter().map(|(&id, &c)| (id, c))
    }

    /// Следующий свободный ID: максимальный + 1, либо 0 для пустой таблицы.
    pub fn next_id(&self) -> FprintResult<u32> {
        match self.entries.keys().next_back() {
            None => Ok(0),
            Some(&last) => last
                .checked_add(1)
                .ok_or_else(|| FprintError::corrupted("fingerprint id space exhausted")),
        }
    }

    /// Сдвигает начало координат: прибавляет (dx, dy) ко всем точкам.
    pub fn offset(
        &mut self,
        dx: f64,
        dy: f64,
    ) {
        for c in self.entries.values_mut() {
            c[0] += dx;
            c[1] += dy;
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_parse_string_keys() {
        let l: Locations = serde_json::from_str(r#"{"10": [5.0, 1.5], "2": [0, 0]}"#).unwrap();

        assert_eq!(l.ids().collect::<Vec<_>>(), vec![2, 10]);
        assert_eq!(l.get(10), Some([5.0, 1.5]));
        assert_eq!(l.next_id().unwrap(), 11);
    }

    #[test]
    fn test_next_id_empty() {
        assert_eq!(Locations::new().next_id().unwrap(), 0);
    }

    #[test]
    fn test_offset() {
        let mut l = Locations::new();
        l.insert(0, [0.0, 0.0]);
        l.insert(1, [10.0, -5.0]);

        l.offset(2.5, -1.0);

        assert_eq!(l.get(0), Some([2.5, -1.0]));
        assert_eq!(l.get(1), Some([12.5, -6.0]));
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("locations.json");
        let mut l = Locations::new();
        l.insert(3, [1.0, 2.0]);

        l.save(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();

        assert_eq!(text, r#"{"3":[1.0,2.0]}"#);
        assert_eq!(Locations::load(&path).unwrap(), l);
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("locations.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(matches!(Locations::load(&path), Err(FprintError::Json(_))));
    }
}
