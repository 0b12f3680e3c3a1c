use casework::assessment::{ModelStorage, OutcomeRecord, StorageError};
use casework::clients::{
    CaseRecord, CaseRepository, CaseWorkerId, ClientId, ClientProfile, ClientRecord,
    ClientRepository, OutcomeRepository, RepositoryError,
};
use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default)]
pub(crate) struct InMemoryClientRepository {
    records: Mutex<BTreeMap<u64, ClientRecord>>,
    next_id: AtomicU64,
}

impl ClientRepository for InMemoryClientRepository {
    fn insert(&self, profile: ClientProfile) -> Result<ClientRecord, RepositoryError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let record = ClientRecord {
            id: ClientId(id),
            profile,
        };
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.insert(id, record.clone());
        Ok(record)
    }

    fn fetch(&self, id: ClientId) -> Result<Option<ClientRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(&id.0).cloned())
    }

    fn update(&self, record: ClientRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id.0) {
            guard.insert(record.id.0, record);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn delete(&self, id: ClientId) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.remove(&id.0).map(|_| ()).ok_or(RepositoryError::NotFound)
    }

    fn list(&self, skip: usize, limit: usize) -> Result<Vec<ClientRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().skip(skip).take(limit).cloned().collect())
    }

    fn count(&self) -> Result<usize, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.len())
    }

    fn all(&self) -> Result<Vec<ClientRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}

#[derive(Default)]
pub(crate) struct InMemoryCaseRepository {
    records: Mutex<HashMap<u64, CaseRecord>>,
}

impl CaseRepository for InMemoryCaseRepository {
    fn assign(&self, record: CaseRecord) -> Result<CaseRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("case mutex poisoned");
        if guard.contains_key(&record.client_id.0) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.client_id.0, record.clone());
        Ok(record)
    }

    fn for_client(&self, client_id: ClientId) -> Result<Option<CaseRecord>, RepositoryError> {
        let guard = self.records.lock().expect("case mutex poisoned");
        Ok(guard.get(&client_id.0).cloned())
    }

    fn for_case_worker(
        &self,
        case_worker_id: CaseWorkerId,
    ) -> Result<Vec<CaseRecord>, RepositoryError> {
        let guard = self.records.lock().expect("case mutex poisoned");
        let mut cases: Vec<CaseRecord> = guard
            .values()
            .filter(|case| case.case_worker_id == case_worker_id)
            .cloned()
            .collect();
        cases.sort_by_key(|case| case.client_id);
        Ok(cases)
    }

    fn update(&self, record: CaseRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("case mutex poisoned");
        if guard.contains_key(&record.client_id.0) {
            guard.insert(record.client_id.0, record);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn remove_for_client(&self, client_id: ClientId) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("case mutex poisoned");
        guard.remove(&client_id.0);
        Ok(())
    }

    fn all(&self) -> Result<Vec<CaseRecord>, RepositoryError> {
        let guard = self.records.lock().expect("case mutex poisoned");
        let mut cases: Vec<CaseRecord> = guard.values().cloned().collect();
        cases.sort_by_key(|case| case.client_id);
        Ok(cases)
    }
}

#[derive(Default)]
pub(crate) struct InMemoryOutcomeRepository {
    records: Mutex<Vec<OutcomeRecord>>,
}

impl OutcomeRepository for InMemoryOutcomeRepository {
    fn append(&self, record: OutcomeRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("outcome mutex poisoned");
        guard.push(record);
        Ok(())
    }

    fn all(&self) -> Result<Vec<OutcomeRecord>, RepositoryError> {
        let guard = self.records.lock().expect("outcome mutex poisoned");
        Ok(guard.clone())
    }
}

/// Model persistence backed by a single file next to the service.
pub(crate) struct FileModelStorage {
    path: PathBuf,
}

impl FileModelStorage {
    pub(crate) fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ModelStorage for FileModelStorage {
    fn load(&self) -> Result<Option<Vec<u8>>, StorageError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StorageError::Unavailable(err.to_string())),
        }
    }

    fn save(&self, bytes: &[u8]) -> Result<(), StorageError> {
        std::fs::write(&self.path, bytes).map_err(|err| StorageError::Unavailable(err.to_string()))
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
