use crate::assessment::OutcomeRecord;

use super::domain::{CaseRecord, CaseWorkerId, ClientId, ClientProfile, ClientRecord};

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Storage abstraction for client records.
pub trait ClientRepository: Send + Sync {
    /// Store a new client, assigning its id.
    fn insert(&self, profile: ClientProfile) -> Result<ClientRecord, RepositoryError>;
    fn fetch(&self, id: ClientId) -> Result<Option<ClientRecord>, RepositoryError>;
    fn update(&self, record: ClientRecord) -> Result<(), RepositoryError>;
    fn delete(&self, id: ClientId) -> Result<(), RepositoryError>;
    /// Page of clients in ascending id order.
    fn list(&self, skip: usize, limit: usize) -> Result<Vec<ClientRecord>, RepositoryError>;
    fn count(&self) -> Result<usize, RepositoryError>;
    /// Every client, for the in-service search filters.
    fn all(&self) -> Result<Vec<ClientRecord>, RepositoryError>;
}

/// Storage abstraction for case assignments.
pub trait CaseRepository: Send + Sync {
    /// Create an assignment; `Conflict` if the client already has one.
    fn assign(&self, record: CaseRecord) -> Result<CaseRecord, RepositoryError>;
    fn for_client(&self, client_id: ClientId) -> Result<Option<CaseRecord>, RepositoryError>;
    fn for_case_worker(
        &self,
        case_worker_id: CaseWorkerId,
    ) -> Result<Vec<CaseRecord>, RepositoryError>;
    fn update(&self, record: CaseRecord) -> Result<(), RepositoryError>;
    /// Drop a client's assignment if present; cascaded from client deletion.
    fn remove_for_client(&self, client_id: ClientId) -> Result<(), RepositoryError>;
    fn all(&self) -> Result<Vec<CaseRecord>, RepositoryError>;
}

/// Append-only store of historical outcome records.
pub trait OutcomeRepository: Send + Sync {
    fn append(&self, record: OutcomeRecord) -> Result<(), RepositoryError>;
    fn all(&self) -> Result<Vec<OutcomeRecord>, RepositoryError>;
}
