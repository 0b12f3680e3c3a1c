//! Client records, case assignments, and the service layer behind the CRUD
//! endpoints. Storage is reached only through the repository traits so the
//! services can be exercised against in-memory fakes.

pub mod domain;
pub mod repository;
pub mod service;

pub use domain::{
    CaseRecord, CaseServiceUpdate, CaseWorkerId, ClientId, ClientPage, ClientProfile,
    ClientRecord, ClientSearchCriteria, ClientUpdate, InterventionStatus, Role, ServiceFilter,
};
pub use repository::{CaseRepository, ClientRepository, OutcomeRepository, RepositoryError};
pub use service::{CaseManagementError, CaseManagementService};
