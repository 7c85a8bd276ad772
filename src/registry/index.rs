use crate::domain::Entry;
use crate::registry::{RegistryError, SortKey};
use std::collections::HashMap;

/// Reverse lookup from marks and paths to positions in the entry list.
///
/// Position lists are kept ascending and free of repeats, so duplicate
/// marks or paths simply show up as several positions.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Index {
    marks: HashMap<String, Vec<usize>>,
    paths: HashMap<String, Vec<usize>>,
}

impl Index {
    /// Builds a fresh index over `entries`.
    pub fn build(entries: &[Entry]) -> Self {
        let mut index = Index::default();
        for (position, entry) in entries.iter().enumerate() {
            index.insert(entry, position);
        }
        index
    }

    /// Records both keys of `entry` at `position`.
    pub fn insert(&mut self, entry: &Entry, position: usize) {
        self.store(SortKey::Mark, &entry.mark, position);
        self.store(SortKey::Path, &entry.path, position);
    }

    /// Positions stored under `value`, ascending. Empty when unknown.
    pub fn positions(&self, key: SortKey, value: &str) -> &[usize] {
        self.table(key).get(value).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, key: SortKey, value: &str) -> bool {
        !self.positions(key, value).is_empty()
    }

    /// Resolves a lookup by mark, by path, or by both.
    ///
    /// When both are given they must point at the very same positions.
    pub fn resolve(
        &self,
        mark: Option<&str>,
        path: Option<&str>,
    ) -> Result<Vec<usize>, RegistryError> {
        match (mark, path) {
            (Some(mark), Some(path)) => {
                let by_mark = self.positions(SortKey::Mark, mark);
                let by_path = self.positions(SortKey::Path, path);
                if by_mark != by_path {
                    return Err(RegistryError::Mismatch {
                        mark: mark.to_owned(),
                        path: path.to_owned(),
                    });
                }
                Ok(by_mark.to_vec())
            }
            (Some(mark), None) => Ok(self.positions(SortKey::Mark, mark).to_vec()),
            (None, Some(path)) => Ok(self.positions(SortKey::Path, path).to_vec()),
            (None, None) => Err(RegistryError::EmptyQuery),
        }
    }

    fn store(&mut self, key: SortKey, value: &str, position: usize) {
        let positions = self.table_mut(key).entry(value.to_owned()).or_default();
        if let Err(slot) = positions.binary_search(&position) {
            positions.insert(slot, position);
        }
    }

    fn table(&self, key: SortKey) -> &HashMap<String, Vec<usize>> {
        match key {
            SortKey::Mark => &self.marks,
            SortKey::Path => &self.paths,
        }
    }

    fn table_mut(&mut self, key: SortKey) -> &mut HashMap<String, Vec<usize>> {
        match key {
            SortKey::Mark => &mut self.marks,
            SortKey::Path => &mut self.paths,
        }
    }
}
