//! Integration coverage of the case-management service: the full client
//! lifecycle from intake through case assignment, service updates, outcome
//! capture, and deletion, exercised against in-memory repositories.

mod common {
    use std::collections::{BTreeMap, HashMap};
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::{Arc, Mutex};

    use casework::assessment::OutcomeRecord;
    use casework::clients::{
        CaseManagementService, CaseRecord, CaseRepository, CaseWorkerId, ClientId, ClientProfile,
        ClientRecord, ClientRepository, OutcomeRepository, RepositoryError,
    };

    #[derive(Default)]
    pub(super) struct MemoryClients {
        records: Mutex<BTreeMap<u64, ClientRecord>>,
        next_id: AtomicU64,
    }

    impl ClientRepository for MemoryClients {
        fn insert(&self, profile: ClientProfile) -> Result<ClientRecord, RepositoryError> {
            let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
            let record = ClientRecord {
                id: ClientId(id),
                profile,
            };
            self.records
                .lock()
                .expect("client mutex poisoned")
                .insert(id, record.clone());
            Ok(record)
        }

        fn fetch(&self, id: ClientId) -> Result<Option<ClientRecord>, RepositoryError> {
            Ok(self
                .records
                .lock()
                .expect("client mutex poisoned")
                .get(&id.0)
                .cloned())
        }

        fn update(&self, record: ClientRecord) -> Result<(), RepositoryError> {
            let mut guard = self.records.lock().expect("client mutex poisoned");
            if guard.contains_key(&record.id.0) {
                guard.insert(record.id.0, record);
                Ok(())
            } else {
                Err(RepositoryError::NotFound)
            }
        }

        fn delete(&self, id: ClientId) -> Result<(), RepositoryError> {
            self.records
                .lock()
                .expect("client mutex poisoned")
                .remove(&id.0)
                .map(|_| ())
                .ok_or(RepositoryError::NotFound)
        }

        fn list(&self, skip: usize, limit: usize) -> Result<Vec<ClientRecord>, RepositoryError> {
            Ok(self
                .records
                .lock()
                .expect("client mutex poisoned")
                .values()
                .skip(skip)
                .take(limit)
                .cloned()
                .collect())
        }

        fn count(&self) -> Result<usize, RepositoryError> {
            Ok(self.records.lock().expect("client mutex poisoned").len())
        }

        fn all(&self) -> Result<Vec<ClientRecord>, RepositoryError> {
            Ok(self
                .records
                .lock()
                .expect("client mutex poisoned")
                .values()
                .cloned()
                .collect())
        }
    }

    #[derive(Default)]
    pub(super) struct MemoryCases {
        records: Mutex<HashMap<u64, CaseRecord>>,
    }

    impl CaseRepository for MemoryCases {
        fn assign(&self, record: CaseRecord) -> Result<CaseRecord, RepositoryError> {
            let mut guard = self.records.lock().expect("case mutex poisoned");
            if guard.contains_key(&record.client_id.0) {
                return Err(RepositoryError::Conflict);
            }
            guard.insert(record.client_id.0, record.clone());
            Ok(record)
        }

        fn for_client(&self, client_id: ClientId) -> Result<Option<CaseRecord>, RepositoryError> {
            Ok(self
                .records
                .lock()
                .expect("case mutex poisoned")
                .get(&client_id.0)
                .cloned())
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
            self.records
                .lock()
                .expect("case mutex poisoned")
                .remove(&client_id.0);
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
    pub(super) struct MemoryOutcomes {
        records: Mutex<Vec<OutcomeRecord>>,
    }

    impl OutcomeRepository for MemoryOutcomes {
        fn append(&self, record: OutcomeRecord) -> Result<(), RepositoryError> {
            self.records
                .lock()
                .expect("outcome mutex poisoned")
                .push(record);
            Ok(())
        }

        fn all(&self) -> Result<Vec<OutcomeRecord>, RepositoryError> {
            Ok(self.records.lock().expect("outcome mutex poisoned").clone())
        }
    }

    pub(super) fn build_service() -> CaseManagementService<MemoryClients, MemoryCases, MemoryOutcomes>
    {
        CaseManagementService::new(
            Arc::new(MemoryClients::default()),
            Arc::new(MemoryCases::default()),
            Arc::new(MemoryOutcomes::default()),
        )
    }

    pub(super) fn profile(age: u8, employed: bool) -> ClientProfile {
        ClientProfile {
            age,
            gender: 1,
            work_experience: 3,
            canada_work_experience: 2,
            dependents: 1,
            born_in_canada: false,
            citizen_status: true,
            education_level: 8,
            fluent_in_english: true,
            reading_scale: 7,
            speaking_scale: 6,
            writing_scale: 6,
            numeracy_scale: 5,
            computer_scale: 8,
            has_transportation: true,
            is_caregiver: false,
            housing_situation: 5,
            income_source: 4,
            has_felony: false,
            attending_school: false,
            currently_employed: employed,
            substance_use: false,
            months_unemployed: 9,
            needs_mental_health_support: false,
        }
    }
}

use chrono::NaiveDate;
use common::{build_service, profile};

use casework::assessment::InterventionKind;
use casework::clients::{
    CaseManagementError, CaseServiceUpdate, CaseWorkerId, ClientId, ClientSearchCriteria,
    ClientUpdate, InterventionStatus, ServiceFilter,
};

#[test]
fn intake_assignment_and_service_updates_round_trip() {
    let service = build_service();

    let client = service
        .create_client(profile(27, false))
        .expect("intake succeeds");
    let worker = CaseWorkerId(7);

    let case = service
        .create_case_assignment(client.id, worker)
        .expect("assignment succeeds");
    assert!(case
        .statuses
        .values()
        .all(|status| *status == InterventionStatus::NotStarted));

    let update = CaseServiceUpdate {
        statuses: [
            (
                InterventionKind::EmploymentAssistance,
                InterventionStatus::InProgress,
            ),
            (
                InterventionKind::LifeStabilization,
                InterventionStatus::Completed,
            ),
        ]
        .into_iter()
        .collect(),
        success_rate: Some(75),
    };
    let case = service
        .update_client_services(client.id, worker, &update)
        .expect("service update succeeds");
    assert_eq!(case.success_rate, 75);
    assert_eq!(
        case.statuses
            .get(&InterventionKind::EmploymentAssistance)
            .copied(),
        Some(InterventionStatus::InProgress)
    );

    let applied = case.applied_interventions();
    assert!(applied.contains(InterventionKind::EmploymentAssistance));
    assert!(applied.contains(InterventionKind::LifeStabilization));
    assert_eq!(applied.len(), 2);
}

#[test]
fn a_client_holds_one_active_assignment() {
    let service = build_service();
    let client = service
        .create_client(profile(30, true))
        .expect("intake succeeds");

    service
        .create_case_assignment(client.id, CaseWorkerId(1))
        .expect("first assignment succeeds");
    let err = service
        .create_case_assignment(client.id, CaseWorkerId(2))
        .expect_err("second assignment is rejected");
    assert!(matches!(err, CaseManagementError::AlreadyAssigned(id) if id == client.id));
}

#[test]
fn updates_through_a_different_worker_are_rejected() {
    let service = build_service();
    let client = service
        .create_client(profile(30, true))
        .expect("intake succeeds");
    service
        .create_case_assignment(client.id, CaseWorkerId(1))
        .expect("assignment succeeds");

    let err = service
        .update_client_services(client.id, CaseWorkerId(99), &CaseServiceUpdate::default())
        .expect_err("wrong worker cannot update the case");
    assert!(matches!(err, CaseManagementError::CaseNotFound(_)));
}

#[test]
fn invalid_intake_is_rejected_with_the_field_name() {
    let service = build_service();
    let too_young = profile(17, false);

    let err = service
        .create_client(too_young)
        .expect_err("minors are out of scope");
    match err {
        CaseManagementError::Validation(validation) => {
            assert_eq!(validation.field, "age");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn profile_updates_are_validated_before_persisting() {
    let service = build_service();
    let client = service
        .create_client(profile(27, false))
        .expect("intake succeeds");

    let update = ClientUpdate {
        education_level: Some(99),
        ..ClientUpdate::default()
    };
    let err = service
        .update_client(client.id, &update)
        .expect_err("out-of-domain level is rejected");
    assert!(matches!(err, CaseManagementError::Validation(_)));

    // The stored record is untouched.
    let stored = service.get_client(client.id).expect("client still exists");
    assert_eq!(stored.profile.education_level, 8);
}

#[test]
fn pagination_and_search_filters() {
    let service = build_service();
    for index in 0..5u8 {
        service
            .create_client(profile(20 + index, index % 2 == 0))
            .expect("intake succeeds");
    }

    let page = service.list_clients(1, 2).expect("page loads");
    assert_eq!(page.clients.len(), 2);
    assert_eq!(page.total, 5);
    assert_eq!(page.clients[0].id, ClientId(2));

    let criteria = ClientSearchCriteria {
        currently_employed: Some(true),
        age_min: Some(21),
        ..ClientSearchCriteria::default()
    };
    let matches = service
        .search_by_criteria(&criteria)
        .expect("search succeeds");
    assert!(matches
        .iter()
        .all(|record| record.profile.currently_employed && record.profile.age >= 21));
    assert_eq!(matches.len(), 2);

    let err = service
        .list_clients(0, 0)
        .expect_err("zero limit is rejected");
    assert!(matches!(err, CaseManagementError::InvalidQuery(_)));
}

#[test]
fn service_and_success_rate_searches_follow_case_state() {
    let service = build_service();
    let first = service
        .create_client(profile(25, false))
        .expect("intake succeeds");
    let second = service
        .create_client(profile(40, true))
        .expect("intake succeeds");

    service
        .create_case_assignment(first.id, CaseWorkerId(1))
        .expect("assignment succeeds");
    service
        .create_case_assignment(second.id, CaseWorkerId(2))
        .expect("assignment succeeds");

    service
        .update_client_services(
            first.id,
            CaseWorkerId(1),
            &CaseServiceUpdate {
                statuses: [(
                    InterventionKind::RetentionServices,
                    InterventionStatus::InProgress,
                )]
                .into_iter()
                .collect(),
                success_rate: Some(85),
            },
        )
        .expect("service update succeeds");

    let filter = ServiceFilter {
        statuses: [(
            InterventionKind::RetentionServices,
            InterventionStatus::InProgress,
        )]
        .into_iter()
        .collect(),
    };
    let matches = service.search_by_services(&filter).expect("search succeeds");
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].id, first.id);

    let high_performers = service
        .search_by_success_rate(70)
        .expect("search succeeds");
    assert_eq!(high_performers.len(), 1);
    assert_eq!(high_performers[0].id, first.id);

    let assigned = service
        .clients_for_case_worker(CaseWorkerId(2))
        .expect("lookup succeeds");
    assert_eq!(assigned.len(), 1);
    assert_eq!(assigned[0].id, second.id);
}

#[test]
fn outcomes_snapshot_the_applied_interventions() {
    let service = build_service();
    let client = service
        .create_client(profile(27, false))
        .expect("intake succeeds");
    service
        .create_case_assignment(client.id, CaseWorkerId(1))
        .expect("assignment succeeds");
    service
        .update_client_services(
            client.id,
            CaseWorkerId(1),
            &CaseServiceUpdate {
                statuses: [(
                    InterventionKind::EmploymentAssistance,
                    InterventionStatus::Completed,
                )]
                .into_iter()
                .collect(),
                success_rate: None,
            },
        )
        .expect("service update succeeds");

    let recorded_on = NaiveDate::from_ymd_opt(2026, 6, 1).expect("valid date");
    let record = service
        .record_outcome(client.id, true, recorded_on)
        .expect("outcome recorded");
    assert!(record.success);
    assert!(record
        .interventions
        .contains(InterventionKind::EmploymentAssistance));
    assert_eq!(record.interventions.len(), 1);

    let history = service.outcome_history().expect("history loads");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0], record);

    // Later profile edits must not rewrite the snapshot.
    service
        .update_client(
            client.id,
            &ClientUpdate {
                currently_employed: Some(true),
                ..ClientUpdate::default()
            },
        )
        .expect("profile update succeeds");
    let history = service.outcome_history().expect("history loads");
    assert_eq!(history[0], record);
}

#[test]
fn deleting_a_client_cascades_to_their_case() {
    let service = build_service();
    let client = service
        .create_client(profile(27, false))
        .expect("intake succeeds");
    service
        .create_case_assignment(client.id, CaseWorkerId(1))
        .expect("assignment succeeds");

    service.delete_client(client.id).expect("delete succeeds");

    assert!(matches!(
        service.get_client(client.id),
        Err(CaseManagementError::ClientNotFound(_))
    ));
    assert!(matches!(
        service.client_services(client.id),
        Err(CaseManagementError::ClientNotFound(_))
    ));
}
