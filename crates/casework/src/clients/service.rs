use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use crate::assessment::{cleaner, OutcomeRecord, ValidationError};

use super::domain::{
    CaseRecord, CaseServiceUpdate, CaseWorkerId, ClientId, ClientPage, ClientProfile,
    ClientRecord, ClientSearchCriteria, ClientUpdate, ServiceFilter,
};
use super::repository::{CaseRepository, ClientRepository, OutcomeRepository, RepositoryError};

/// Largest page the list endpoint will serve in one request.
const MAX_PAGE_SIZE: usize = 150;

/// Service composing the client, case, and outcome repositories.
pub struct CaseManagementService<C, K, O> {
    clients: Arc<C>,
    cases: Arc<K>,
    outcomes: Arc<O>,
}

impl<C, K, O> CaseManagementService<C, K, O>
where
    C: ClientRepository + 'static,
    K: CaseRepository + 'static,
    O: OutcomeRepository + 'static,
{
    pub fn new(clients: Arc<C>, cases: Arc<K>, outcomes: Arc<O>) -> Self {
        Self {
            clients,
            cases,
            outcomes,
        }
    }

    /// Intake a new client after boundary validation.
    pub fn create_client(
        &self,
        profile: ClientProfile,
    ) -> Result<ClientRecord, CaseManagementError> {
        cleaner::clean(&(&profile).into())?;
        let record = self.clients.insert(profile)?;
        info!(client_id = record.id.0, "client created");
        Ok(record)
    }

    pub fn get_client(&self, id: ClientId) -> Result<ClientRecord, CaseManagementError> {
        self.clients
            .fetch(id)?
            .ok_or(CaseManagementError::ClientNotFound(id))
    }

    pub fn list_clients(
        &self,
        skip: usize,
        limit: usize,
    ) -> Result<ClientPage, CaseManagementError> {
        if limit == 0 {
            return Err(CaseManagementError::InvalidQuery(
                "limit must be greater than 0".to_string(),
            ));
        }
        if limit > MAX_PAGE_SIZE {
            return Err(CaseManagementError::InvalidQuery(format!(
                "limit cannot exceed {MAX_PAGE_SIZE}"
            )));
        }
        let clients = self.clients.list(skip, limit)?;
        let total = self.clients.count()?;
        Ok(ClientPage { clients, total })
    }

    pub fn search_by_criteria(
        &self,
        criteria: &ClientSearchCriteria,
    ) -> Result<Vec<ClientRecord>, CaseManagementError> {
        if let Some(level) = criteria.education_level {
            if !(1..=14).contains(&level) {
                return Err(CaseManagementError::InvalidQuery(
                    "education level must be between 1 and 14".to_string(),
                ));
            }
        }
        if let Some(age_min) = criteria.age_min {
            if age_min < 18 {
                return Err(CaseManagementError::InvalidQuery(
                    "minimum age must be at least 18".to_string(),
                ));
            }
        }
        if let Some(gender) = criteria.gender {
            if !(1..=2).contains(&gender) {
                return Err(CaseManagementError::InvalidQuery(
                    "gender must be 1 or 2".to_string(),
                ));
            }
        }

        let matches = self
            .clients
            .all()?
            .into_iter()
            .filter(|record| criteria.matches(&record.profile))
            .collect();
        Ok(matches)
    }

    /// Clients whose case matches every supplied intervention-status filter.
    pub fn search_by_services(
        &self,
        filter: &ServiceFilter,
    ) -> Result<Vec<ClientRecord>, CaseManagementError> {
        let mut results = Vec::new();
        for case in self.cases.all()? {
            if filter.matches(&case) {
                if let Some(client) = self.clients.fetch(case.client_id)? {
                    results.push(client);
                }
            }
        }
        Ok(results)
    }

    /// Clients whose observed success rate meets the threshold.
    pub fn search_by_success_rate(
        &self,
        min_rate: u8,
    ) -> Result<Vec<ClientRecord>, CaseManagementError> {
        if min_rate > 100 {
            return Err(CaseManagementError::InvalidQuery(
                "success rate must be between 0 and 100".to_string(),
            ));
        }
        let mut results = Vec::new();
        for case in self.cases.all()? {
            if case.success_rate >= min_rate {
                if let Some(client) = self.clients.fetch(case.client_id)? {
                    results.push(client);
                }
            }
        }
        Ok(results)
    }

    pub fn clients_for_case_worker(
        &self,
        case_worker_id: CaseWorkerId,
    ) -> Result<Vec<ClientRecord>, CaseManagementError> {
        let mut results = Vec::new();
        for case in self.cases.for_case_worker(case_worker_id)? {
            if let Some(client) = self.clients.fetch(case.client_id)? {
                results.push(client);
            }
        }
        Ok(results)
    }

    pub fn client_services(&self, client_id: ClientId) -> Result<CaseRecord, CaseManagementError> {
        self.get_client(client_id)?;
        self.cases
            .for_client(client_id)?
            .ok_or(CaseManagementError::CaseNotFound(client_id))
    }

    pub fn update_client(
        &self,
        id: ClientId,
        update: &ClientUpdate,
    ) -> Result<ClientRecord, CaseManagementError> {
        let mut record = self.get_client(id)?;
        update.apply(&mut record.profile);
        cleaner::clean(&(&record.profile).into())?;
        self.clients.update(record.clone())?;
        Ok(record)
    }

    /// Update intervention statuses and/or the observed success rate on the
    /// case held by the given worker.
    pub fn update_client_services(
        &self,
        client_id: ClientId,
        case_worker_id: CaseWorkerId,
        update: &CaseServiceUpdate,
    ) -> Result<CaseRecord, CaseManagementError> {
        let mut case = self
            .cases
            .for_client(client_id)?
            .filter(|case| case.case_worker_id == case_worker_id)
            .ok_or(CaseManagementError::CaseNotFound(client_id))?;

        if let Some(rate) = update.success_rate {
            if rate > 100 {
                return Err(CaseManagementError::InvalidQuery(
                    "success rate must be between 0 and 100".to_string(),
                ));
            }
            case.success_rate = rate;
        }
        for (kind, status) in &update.statuses {
            case.statuses.insert(*kind, *status);
        }

        self.cases.update(case.clone())?;
        Ok(case)
    }

    /// Assign a case worker; a client holds at most one active assignment.
    pub fn create_case_assignment(
        &self,
        client_id: ClientId,
        case_worker_id: CaseWorkerId,
    ) -> Result<CaseRecord, CaseManagementError> {
        self.get_client(client_id)?;
        match self.cases.assign(CaseRecord::new(client_id, case_worker_id)) {
            Ok(case) => {
                info!(
                    client_id = client_id.0,
                    case_worker_id = case_worker_id.0,
                    "case assignment created"
                );
                Ok(case)
            }
            Err(RepositoryError::Conflict) => {
                Err(CaseManagementError::AlreadyAssigned(client_id))
            }
            Err(other) => Err(other.into()),
        }
    }

    /// Delete a client, cascading to their case assignment.
    pub fn delete_client(&self, id: ClientId) -> Result<(), CaseManagementError> {
        self.get_client(id)?;
        self.cases.remove_for_client(id)?;
        self.clients.delete(id)?;
        info!(client_id = id.0, "client deleted");
        Ok(())
    }

    /// Snapshot the client's current features and applied interventions as an
    /// immutable outcome record for future retraining.
    pub fn record_outcome(
        &self,
        client_id: ClientId,
        success: bool,
        recorded_on: NaiveDate,
    ) -> Result<OutcomeRecord, CaseManagementError> {
        let client = self.get_client(client_id)?;
        let case = self
            .cases
            .for_client(client_id)?
            .ok_or(CaseManagementError::CaseNotFound(client_id))?;

        let record = OutcomeRecord {
            features: cleaner::clean(&(&client.profile).into())?,
            interventions: case.applied_interventions(),
            success,
            recorded_on,
        };
        self.outcomes.append(record.clone())?;
        Ok(record)
    }

    /// Accumulated outcome history, consumed by the retrain flow.
    pub fn outcome_history(&self) -> Result<Vec<OutcomeRecord>, CaseManagementError> {
        Ok(self.outcomes.all()?)
    }
}

/// Error raised by the case-management service.
#[derive(Debug, thiserror::Error)]
pub enum CaseManagementError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("client with id {0} not found")]
    ClientNotFound(ClientId),
    #[error("no case assignment found for client {0}")]
    CaseNotFound(ClientId),
    #[error("client {0} already has an active case assignment")]
    AlreadyAssigned(ClientId),
    #[error("invalid query: {0}")]
    InvalidQuery(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
