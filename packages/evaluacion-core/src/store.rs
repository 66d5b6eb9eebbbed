//! In-memory record store with store-assigned ids and upsert semantics.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use crate::entity::Evaluacion;
use crate::error::DbError;
use crate::sort::Sort;

/// How a save landed in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// A new record was inserted and given a fresh id
    Created,
    /// An existing record was overwritten
    Updated,
}

#[derive(Debug)]
struct StoreState {
    records: BTreeMap<u64, Evaluacion>,
    next_id: u64,
}

impl StoreState {
    /// Assigns the next free id. Must be called with the write lock held.
    fn allocate_id(&mut self) -> Result<u64, DbError> {
        let id = self.next_id;
        if self.records.contains_key(&id) {
            return Err(DbError::DataCorruption(format!(
                "id {} already allocated (next_id out of sync)",
                id
            )));
        }
        self.next_id = id.checked_add(1).ok_or_else(|| {
            DbError::DataCorruption("id space exhausted".to_string())
        })?;
        Ok(id)
    }

    fn insert_new(&mut self, mut record: Evaluacion) -> Result<Evaluacion, DbError> {
        let id = self.allocate_id()?;
        record.id = Some(id);
        self.records.insert(id, record.clone());
        Ok(record)
    }
}

/// Durable mapping from id to [`Evaluacion`].
///
/// Every operation takes the internal lock exactly once, so each call is a
/// single unit of work relative to concurrent callers. Id assignment happens
/// under the write lock.
#[derive(Debug)]
pub struct EvaluacionStore {
    state: RwLock<StoreState>,
    /// Bumped on every successful mutation; used to detect unflushed changes
    modifications: AtomicU64,
}

impl EvaluacionStore {
    /// Creates an empty store. The first id handed out is 1.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(StoreState {
                records: BTreeMap::new(),
                next_id: 1,
            }),
            modifications: AtomicU64::new(0),
        }
    }

    /// Rebuilds a store from persisted records.
    ///
    /// Every record must carry an id and ids must be unique. `next_id` is
    /// raised above the largest loaded id if needed.
    pub fn from_records(records: Vec<Evaluacion>, next_id: u64) -> Result<Self, DbError> {
        let mut map = BTreeMap::new();
        for record in records {
            let id = record.id.ok_or_else(|| {
                DbError::DataCorruption("persisted record without id".to_string())
            })?;
            if map.insert(id, record).is_some() {
                return Err(DbError::DataCorruption(format!(
                    "duplicate persisted id {}",
                    id
                )));
            }
        }
        let floor = match map.keys().next_back() {
            Some(max) => max.saturating_add(1),
            None => 1,
        };
        Ok(Self {
            state: RwLock::new(StoreState {
                records: map,
                next_id: next_id.max(floor),
            }),
            modifications: AtomicU64::new(0),
        })
    }

    /// Inserts a new record and returns it with its assigned id.
    ///
    /// # Errors
    /// `IdAlreadyExists` if the record carries an id that is already stored;
    /// the store is left untouched. An id that is not stored is ignored and
    /// replaced with a fresh one.
    pub fn create(&self, record: Evaluacion) -> Result<Evaluacion, DbError> {
        let mut state = self.state.write().map_err(|_| DbError::LockPoisoned)?;
        if let Some(id) = record.id {
            if state.records.contains_key(&id) {
                return Err(DbError::IdAlreadyExists { id });
            }
        }
        let created = state.insert_new(record)?;
        drop(state);
        self.modifications.fetch_add(1, Ordering::Release);
        tracing::info!("Created evaluacion {:?}", created.id);
        Ok(created)
    }

    /// Returns a snapshot of all records ordered by `sort`.
    pub fn find_all(&self, sort: &Sort) -> Result<Vec<Evaluacion>, DbError> {
        let state = self.state.read().map_err(|_| DbError::LockPoisoned)?;
        let mut records: Vec<Evaluacion> = state.records.values().cloned().collect();
        drop(state);
        records.sort_by(|a, b| sort.compare(a, b));
        tracing::debug!("Listed {} evaluacions", records.len());
        Ok(records)
    }

    /// Looks up a record by id.
    pub fn find_by_id(&self, id: u64) -> Result<Evaluacion, DbError> {
        let state = self.state.read().map_err(|_| DbError::LockPoisoned)?;
        state
            .records
            .get(&id)
            .cloned()
            .ok_or(DbError::RecordNotFound { id })
    }

    /// Saves a record, creating it when its id is unset or not stored.
    ///
    /// Returns the stored record and whether it was created or updated.
    pub fn update(&self, record: Evaluacion) -> Result<(Evaluacion, SaveOutcome), DbError> {
        let mut state = self.state.write().map_err(|_| DbError::LockPoisoned)?;
        let result = match record.id {
            Some(id) if state.records.contains_key(&id) => {
                state.records.insert(id, record.clone());
                (record, SaveOutcome::Updated)
            }
            _ => (state.insert_new(record)?, SaveOutcome::Created),
        };
        drop(state);
        self.modifications.fetch_add(1, Ordering::Release);
        tracing::info!("Saved evaluacion {:?} ({:?})", result.0.id, result.1);
        Ok(result)
    }

    /// Removes a record. Returns whether a record was actually removed.
    pub fn delete(&self, id: u64) -> Result<bool, DbError> {
        let mut state = self.state.write().map_err(|_| DbError::LockPoisoned)?;
        let removed = state.records.remove(&id).is_some();
        drop(state);
        if removed {
            self.modifications.fetch_add(1, Ordering::Release);
            tracing::info!("Deleted evaluacion {}", id);
        } else {
            tracing::debug!("Delete of absent evaluacion {} ignored", id);
        }
        Ok(removed)
    }

    /// Number of stored records.
    pub fn count(&self) -> Result<usize, DbError> {
        let state = self.state.read().map_err(|_| DbError::LockPoisoned)?;
        Ok(state.records.len())
    }

    /// Consistent copy of the records (id order), the next id and the
    /// modification counter at the time of the copy.
    pub fn snapshot(&self) -> Result<(Vec<Evaluacion>, u64, u64), DbError> {
        let state = self.state.read().map_err(|_| DbError::LockPoisoned)?;
        let records = state.records.values().cloned().collect();
        let modifications = self.modifications.load(Ordering::Acquire);
        Ok((records, state.next_id, modifications))
    }

    /// Current value of the modification counter.
    pub fn modifications(&self) -> u64 {
        self.modifications.load(Ordering::Acquire)
    }
}

impl Default for EvaluacionStore {
    fn default() -> Self {
        Self::new()
    }
}
