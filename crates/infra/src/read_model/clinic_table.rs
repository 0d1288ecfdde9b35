use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use clinicops_agents::RepositoryError;
use clinicops_core::ClinicId;

/// Clinic-isolated key/value table for in-memory storage.
///
/// Rows are keyed by `(clinic, key)` and listed in key order.
#[derive(Debug)]
pub struct ClinicTable<K, V> {
    inner: RwLock<BTreeMap<(ClinicId, K), V>>,
}

impl<K, V> Default for ClinicTable<K, V> {
    fn default() -> Self {
        Self {
            inner: RwLock::new(BTreeMap::new()),
        }
    }
}

impl<K, V> ClinicTable<K, V>
where
    K: Clone + Ord + core::fmt::Display,
    V: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<(ClinicId, K), V>>, RepositoryError> {
        self.inner
            .read()
            .map_err(|_| RepositoryError::Unavailable("table lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<(ClinicId, K), V>>, RepositoryError> {
        self.inner
            .write()
            .map_err(|_| RepositoryError::Unavailable("table lock poisoned".into()))
    }

    pub fn get(&self, clinic_id: &ClinicId, key: &K) -> Result<Option<V>, RepositoryError> {
        let map = self.read()?;
        Ok(map.get(&(clinic_id.clone(), key.clone())).cloned())
    }

    /// Insert a row that must not exist yet.
    pub fn insert(&self, clinic_id: ClinicId, key: K, value: V) -> Result<(), RepositoryError> {
        let mut map = self.write()?;
        let slot = (clinic_id, key);
        if map.contains_key(&slot) {
            return Err(RepositoryError::Conflict(format!(
                "{} already exists in clinic {}",
                slot.1, slot.0
            )));
        }
        map.insert(slot, value);
        Ok(())
    }

    /// Apply `f` to the row (or `None` when absent) and store what it returns.
    pub fn upsert_with(
        &self,
        clinic_id: ClinicId,
        key: K,
        f: impl FnOnce(Option<V>) -> V,
    ) -> Result<V, RepositoryError> {
        let mut map = self.write()?;
        let slot = (clinic_id, key);
        let next = f(map.get(&slot).cloned());
        map.insert(slot, next.clone());
        Ok(next)
    }

    /// Mutate an existing row; `NotFound` when absent.
    pub fn update(
        &self,
        clinic_id: &ClinicId,
        key: &K,
        f: impl FnOnce(&mut V),
    ) -> Result<V, RepositoryError> {
        let mut map = self.write()?;
        match map.get_mut(&(clinic_id.clone(), key.clone())) {
            Some(row) => {
                f(row);
                Ok(row.clone())
            }
            None => Err(RepositoryError::NotFound(format!(
                "{key} in clinic {clinic_id}"
            ))),
        }
    }

    pub fn list(&self, clinic_id: &ClinicId) -> Result<Vec<V>, RepositoryError> {
        let map = self.read()?;
        Ok(map
            .iter()
            .filter_map(|((c, _k), v)| (c == clinic_id).then(|| v.clone()))
            .collect())
    }

    /// Find the first row with `key` in any clinic.
    pub fn find_key(&self, key: &K) -> Result<Option<(ClinicId, V)>, RepositoryError> {
        let map = self.read()?;
        Ok(map
            .iter()
            .find(|((_c, k), _v)| k == key)
            .map(|((c, _k), v)| (c.clone(), v.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_isolated_per_clinic() {
        let table: ClinicTable<String, u32> = ClinicTable::new();
        let a = ClinicId::new("a");
        let b = ClinicId::new("b");
        table.insert(a.clone(), "x".into(), 1).unwrap();
        table.insert(b.clone(), "x".into(), 2).unwrap();

        assert_eq!(table.list(&a).unwrap(), [1]);
        assert_eq!(table.get(&b, &"x".to_string()).unwrap(), Some(2));
    }

    #[test]
    fn insert_rejects_duplicates() {
        let table: ClinicTable<String, u32> = ClinicTable::new();
        let a = ClinicId::new("a");
        table.insert(a.clone(), "x".into(), 1).unwrap();
        let err = table.insert(a, "x".into(), 9).unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[test]
    fn list_is_key_ordered() {
        let table: ClinicTable<String, &str> = ClinicTable::new();
        let a = ClinicId::new("a");
        table.insert(a.clone(), "b".into(), "second").unwrap();
        table.insert(a.clone(), "a".into(), "first").unwrap();
        assert_eq!(table.list(&a).unwrap(), ["first", "second"]);
    }

    #[test]
    fn update_missing_row_is_not_found() {
        let table: ClinicTable<String, u32> = ClinicTable::new();
        let err = table
            .update(&ClinicId::new("a"), &"x".to_string(), |v| *v += 1)
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(_)));
    }
}
