use crate::auth::{RequireAdmin, RequireStaff};
use crate::infra::AppState;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use casework::assessment::{
    AssessmentService, ModelStorage, RecommendationReport, RecommendationRequest,
};
use casework::clients::{
    CaseRecord, CaseRepository, CaseServiceUpdate, CaseWorkerId, ClientId, ClientPage,
    ClientProfile, ClientRecord, ClientRepository, ClientSearchCriteria, ClientUpdate,
    OutcomeRepository, ServiceFilter,
};
use casework::clients::CaseManagementService;
use casework::error::AppError;
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

/// Shared handler state: the CRUD service plus the recommendation facade.
pub(crate) struct ApiState<C, K, O, S> {
    pub(crate) cases: Arc<CaseManagementService<C, K, O>>,
    pub(crate) assessments: Arc<AssessmentService<S>>,
}

impl<C, K, O, S> Clone for ApiState<C, K, O, S> {
    fn clone(&self) -> Self {
        Self {
            cases: self.cases.clone(),
            assessments: self.assessments.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct PaginationQuery {
    #[serde(default)]
    pub(crate) skip: usize,
    #[serde(default = "default_page_limit")]
    pub(crate) limit: usize,
}

fn default_page_limit() -> usize {
    50
}

#[derive(Debug, Deserialize)]
pub(crate) struct AssignmentRequest {
    pub(crate) case_worker_id: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OutcomeRequest {
    pub(crate) success: bool,
    #[serde(default)]
    pub(crate) recorded_on: Option<NaiveDate>,
}

pub(crate) fn api_router<C, K, O, S>(state: ApiState<C, K, O, S>) -> Router
where
    C: ClientRepository + 'static,
    K: CaseRepository + 'static,
    O: OutcomeRepository + 'static,
    S: ModelStorage + 'static,
{
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route(
            "/api/v1/clients",
            get(list_clients_handler::<C, K, O, S>).post(create_client_handler::<C, K, O, S>),
        )
        .route(
            "/api/v1/clients/search/by-criteria",
            post(search_by_criteria_handler::<C, K, O, S>),
        )
        .route(
            "/api/v1/clients/search/by-services",
            post(search_by_services_handler::<C, K, O, S>),
        )
        .route(
            "/api/v1/clients/search/success-rate/:min_rate",
            get(search_by_success_rate_handler::<C, K, O, S>),
        )
        .route(
            "/api/v1/clients/case-worker/:case_worker_id",
            get(case_worker_clients_handler::<C, K, O, S>),
        )
        .route(
            "/api/v1/clients/:client_id",
            get(get_client_handler::<C, K, O, S>)
                .put(update_client_handler::<C, K, O, S>)
                .delete(delete_client_handler::<C, K, O, S>),
        )
        .route(
            "/api/v1/clients/:client_id/services",
            get(client_services_handler::<C, K, O, S>),
        )
        .route(
            "/api/v1/clients/:client_id/services/:case_worker_id",
            axum::routing::put(update_client_services_handler::<C, K, O, S>),
        )
        .route(
            "/api/v1/clients/:client_id/case-assignment",
            post(create_case_assignment_handler::<C, K, O, S>),
        )
        .route(
            "/api/v1/clients/:client_id/outcomes",
            post(record_outcome_handler::<C, K, O, S>),
        )
        .route(
            "/api/v1/assessments/recommendations",
            post(recommend_handler::<C, K, O, S>),
        )
        .route("/api/v1/model", get(model_summary_handler::<C, K, O, S>))
        .route(
            "/api/v1/model/retrain",
            post(retrain_handler::<C, K, O, S>),
        )
        .with_state(state)
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn create_client_handler<C, K, O, S>(
    State(state): State<ApiState<C, K, O, S>>,
    _admin: RequireAdmin,
    Json(profile): Json<ClientProfile>,
) -> Result<(StatusCode, Json<ClientRecord>), AppError>
where
    C: ClientRepository + 'static,
    K: CaseRepository + 'static,
    O: OutcomeRepository + 'static,
    S: ModelStorage + 'static,
{
    let record = state.cases.create_client(profile)?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub(crate) async fn list_clients_handler<C, K, O, S>(
    State(state): State<ApiState<C, K, O, S>>,
    _admin: RequireAdmin,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ClientPage>, AppError>
where
    C: ClientRepository + 'static,
    K: CaseRepository + 'static,
    O: OutcomeRepository + 'static,
    S: ModelStorage + 'static,
{
    let page = state.cases.list_clients(pagination.skip, pagination.limit)?;
    Ok(Json(page))
}

pub(crate) async fn get_client_handler<C, K, O, S>(
    State(state): State<ApiState<C, K, O, S>>,
    _staff: RequireStaff,
    Path(client_id): Path<u64>,
) -> Result<Json<ClientRecord>, AppError>
where
    C: ClientRepository + 'static,
    K: CaseRepository + 'static,
    O: OutcomeRepository + 'static,
    S: ModelStorage + 'static,
{
    let record = state.cases.get_client(ClientId(client_id))?;
    Ok(Json(record))
}

pub(crate) async fn search_by_criteria_handler<C, K, O, S>(
    State(state): State<ApiState<C, K, O, S>>,
    _admin: RequireAdmin,
    Json(criteria): Json<ClientSearchCriteria>,
) -> Result<Json<Vec<ClientRecord>>, AppError>
where
    C: ClientRepository + 'static,
    K: CaseRepository + 'static,
    O: OutcomeRepository + 'static,
    S: ModelStorage + 'static,
{
    let matches = state.cases.search_by_criteria(&criteria)?;
    Ok(Json(matches))
}

pub(crate) async fn search_by_services_handler<C, K, O, S>(
    State(state): State<ApiState<C, K, O, S>>,
    _admin: RequireAdmin,
    Json(filter): Json<ServiceFilter>,
) -> Result<Json<Vec<ClientRecord>>, AppError>
where
    C: ClientRepository + 'static,
    K: CaseRepository + 'static,
    O: OutcomeRepository + 'static,
    S: ModelStorage + 'static,
{
    let matches = state.cases.search_by_services(&filter)?;
    Ok(Json(matches))
}

pub(crate) async fn search_by_success_rate_handler<C, K, O, S>(
    State(state): State<ApiState<C, K, O, S>>,
    _admin: RequireAdmin,
    Path(min_rate): Path<u8>,
) -> Result<Json<Vec<ClientRecord>>, AppError>
where
    C: ClientRepository + 'static,
    K: CaseRepository + 'static,
    O: OutcomeRepository + 'static,
    S: ModelStorage + 'static,
{
    let matches = state.cases.search_by_success_rate(min_rate)?;
    Ok(Json(matches))
}

pub(crate) async fn case_worker_clients_handler<C, K, O, S>(
    State(state): State<ApiState<C, K, O, S>>,
    _staff: RequireStaff,
    Path(case_worker_id): Path<u64>,
) -> Result<Json<Vec<ClientRecord>>, AppError>
where
    C: ClientRepository + 'static,
    K: CaseRepository + 'static,
    O: OutcomeRepository + 'static,
    S: ModelStorage + 'static,
{
    let clients = state
        .cases
        .clients_for_case_worker(CaseWorkerId(case_worker_id))?;
    Ok(Json(clients))
}

pub(crate) async fn client_services_handler<C, K, O, S>(
    State(state): State<ApiState<C, K, O, S>>,
    _staff: RequireStaff,
    Path(client_id): Path<u64>,
) -> Result<Json<CaseRecord>, AppError>
where
    C: ClientRepository + 'static,
    K: CaseRepository + 'static,
    O: OutcomeRepository + 'static,
    S: ModelStorage + 'static,
{
    let case = state.cases.client_services(ClientId(client_id))?;
    Ok(Json(case))
}

pub(crate) async fn update_client_handler<C, K, O, S>(
    State(state): State<ApiState<C, K, O, S>>,
    _staff: RequireStaff,
    Path(client_id): Path<u64>,
    Json(update): Json<ClientUpdate>,
) -> Result<Json<ClientRecord>, AppError>
where
    C: ClientRepository + 'static,
    K: CaseRepository + 'static,
    O: OutcomeRepository + 'static,
    S: ModelStorage + 'static,
{
    let record = state.cases.update_client(ClientId(client_id), &update)?;
    Ok(Json(record))
}

pub(crate) async fn update_client_services_handler<C, K, O, S>(
    State(state): State<ApiState<C, K, O, S>>,
    _staff: RequireStaff,
    Path((client_id, case_worker_id)): Path<(u64, u64)>,
    Json(update): Json<CaseServiceUpdate>,
) -> Result<Json<CaseRecord>, AppError>
where
    C: ClientRepository + 'static,
    K: CaseRepository + 'static,
    O: OutcomeRepository + 'static,
    S: ModelStorage + 'static,
{
    let case = state.cases.update_client_services(
        ClientId(client_id),
        CaseWorkerId(case_worker_id),
        &update,
    )?;
    Ok(Json(case))
}

pub(crate) async fn create_case_assignment_handler<C, K, O, S>(
    State(state): State<ApiState<C, K, O, S>>,
    _admin: RequireAdmin,
    Path(client_id): Path<u64>,
    Json(request): Json<AssignmentRequest>,
) -> Result<(StatusCode, Json<CaseRecord>), AppError>
where
    C: ClientRepository + 'static,
    K: CaseRepository + 'static,
    O: OutcomeRepository + 'static,
    S: ModelStorage + 'static,
{
    let case = state
        .cases
        .create_case_assignment(ClientId(client_id), CaseWorkerId(request.case_worker_id))?;
    Ok((StatusCode::CREATED, Json(case)))
}

pub(crate) async fn delete_client_handler<C, K, O, S>(
    State(state): State<ApiState<C, K, O, S>>,
    _admin: RequireAdmin,
    Path(client_id): Path<u64>,
) -> Result<StatusCode, AppError>
where
    C: ClientRepository + 'static,
    K: CaseRepository + 'static,
    O: OutcomeRepository + 'static,
    S: ModelStorage + 'static,
{
    state.cases.delete_client(ClientId(client_id))?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn record_outcome_handler<C, K, O, S>(
    State(state): State<ApiState<C, K, O, S>>,
    _staff: RequireStaff,
    Path(client_id): Path<u64>,
    Json(request): Json<OutcomeRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError>
where
    C: ClientRepository + 'static,
    K: CaseRepository + 'static,
    O: OutcomeRepository + 'static,
    S: ModelStorage + 'static,
{
    let recorded_on = request
        .recorded_on
        .unwrap_or_else(|| Local::now().date_naive());
    let record = state
        .cases
        .record_outcome(ClientId(client_id), request.success, recorded_on)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "client_id": client_id,
            "success": record.success,
            "recorded_on": record.recorded_on,
            "interventions": record.interventions,
        })),
    ))
}

pub(crate) async fn recommend_handler<C, K, O, S>(
    State(state): State<ApiState<C, K, O, S>>,
    _staff: RequireStaff,
    Json(request): Json<RecommendationRequest>,
) -> Result<Json<RecommendationReport>, AppError>
where
    C: ClientRepository + 'static,
    K: CaseRepository + 'static,
    O: OutcomeRepository + 'static,
    S: ModelStorage + 'static,
{
    let report = state.assessments.recommend(&request)?;
    Ok(Json(report))
}

pub(crate) async fn model_summary_handler<C, K, O, S>(
    State(state): State<ApiState<C, K, O, S>>,
    _staff: RequireStaff,
) -> Result<Json<serde_json::Value>, AppError>
where
    C: ClientRepository + 'static,
    K: CaseRepository + 'static,
    O: OutcomeRepository + 'static,
    S: ModelStorage + 'static,
{
    let payload = match state.assessments.model_summary() {
        Some(summary) => json!({ "trained": true, "model": summary }),
        None => json!({ "trained": false, "model": serde_json::Value::Null }),
    };
    Ok(Json(payload))
}

pub(crate) async fn retrain_handler<C, K, O, S>(
    State(state): State<ApiState<C, K, O, S>>,
    _admin: RequireAdmin,
) -> Result<Json<serde_json::Value>, AppError>
where
    C: ClientRepository + 'static,
    K: CaseRepository + 'static,
    O: OutcomeRepository + 'static,
    S: ModelStorage + 'static,
{
    let records = state.cases.outcome_history()?;
    let summary = state.assessments.retrain(&records)?;
    Ok(Json(json!({ "trained": true, "model": summary })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthState;
    use crate::infra::{
        InMemoryCaseRepository, InMemoryClientRepository, InMemoryOutcomeRepository,
    };
    use casework::assessment::{
        clean, train, InterventionKind, ModelStore, OutcomeRecord, StorageError,
    };
    use casework::clients::InterventionStatus;
    use casework::config::AuthConfig;
    use std::sync::Mutex;
    use tower::ServiceExt;

    #[derive(Default)]
    struct MemoryStorage {
        blob: Mutex<Option<Vec<u8>>>,
    }

    impl ModelStorage for MemoryStorage {
        fn load(&self) -> Result<Option<Vec<u8>>, StorageError> {
            Ok(self.blob.lock().expect("storage mutex poisoned").clone())
        }

        fn save(&self, blob: &[u8]) -> Result<(), StorageError> {
            *self.blob.lock().expect("storage mutex poisoned") = Some(blob.to_vec());
            Ok(())
        }
    }

    type TestState = ApiState<
        InMemoryClientRepository,
        InMemoryCaseRepository,
        InMemoryOutcomeRepository,
        MemoryStorage,
    >;

    fn test_state() -> TestState {
        ApiState {
            cases: Arc::new(CaseManagementService::new(
                Arc::new(InMemoryClientRepository::default()),
                Arc::new(InMemoryCaseRepository::default()),
                Arc::new(InMemoryOutcomeRepository::default()),
            )),
            assessments: Arc::new(AssessmentService::new(
                Arc::new(ModelStore::empty()),
                Arc::new(MemoryStorage::default()),
            )),
        }
    }

    fn profile_json(age: u64, employed: bool) -> serde_json::Value {
        json!({
            "age": age,
            "gender": 1,
            "work_experience": 3,
            "canada_work_experience": 2,
            "dependents": 1,
            "born_in_canada": false,
            "citizen_status": true,
            "education_level": 8,
            "fluent_in_english": true,
            "reading_scale": 7,
            "speaking_scale": 6,
            "writing_scale": 6,
            "numeracy_scale": 5,
            "computer_scale": 8,
            "has_transportation": true,
            "is_caregiver": false,
            "housing_situation": 5,
            "income_source": 4,
            "has_felony": false,
            "attending_school": false,
            "currently_employed": employed,
            "substance_use": false,
            "months_unemployed": 9,
            "needs_mental_health_support": false
        })
    }

    fn request(
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> axum::http::Request<axum::body::Body> {
        let builder = axum::http::Request::builder()
            .method(method)
            .uri(uri)
            .header(axum::http::header::CONTENT_TYPE, "application/json");
        match body {
            Some(value) => builder
                .body(axum::body::Body::from(
                    serde_json::to_vec(&value).expect("body serializes"),
                ))
                .expect("request builds"),
            None => builder
                .body(axum::body::Body::empty())
                .expect("request builds"),
        }
    }

    async fn read_json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body reads");
        serde_json::from_slice(&bytes).expect("body is json")
    }

    fn trained_model_records() -> Vec<OutcomeRecord> {
        let date = NaiveDate::from_ymd_opt(2026, 1, 15).expect("valid date");
        let mut records = Vec::new();
        for index in 0..20u64 {
            let raw = serde_json::from_value(profile_json(20 + index % 30, index % 2 == 0))
                .expect("profile deserializes");
            let features = clean(&raw).expect("profile is valid");
            let interventions = if index % 2 == 0 {
                casework::assessment::InterventionCombination::new(vec![
                    InterventionKind::EmploymentAssistance,
                ])
            } else {
                casework::assessment::InterventionCombination::empty()
            };
            records.push(OutcomeRecord {
                features,
                interventions,
                success: index % 2 == 0,
                recorded_on: date,
            });
        }
        records
    }

    #[tokio::test]
    async fn create_and_fetch_client_round_trip() {
        let router = api_router(test_state());

        let response = router
            .clone()
            .oneshot(request("POST", "/api/v1/clients", Some(profile_json(27, false))))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = read_json_body(response).await;
        assert_eq!(created.get("id"), Some(&json!(1)));

        let response = router
            .oneshot(request("GET", "/api/v1/clients/1", None))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::OK);
        let fetched = read_json_body(response).await;
        assert_eq!(fetched.get("age"), Some(&json!(27)));
    }

    #[tokio::test]
    async fn invalid_profile_is_unprocessable() {
        let router = api_router(test_state());

        let mut body = profile_json(27, false);
        body["age"] = json!(15);
        let response = router
            .oneshot(request("POST", "/api/v1/clients", Some(body)))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let payload = read_json_body(response).await;
        assert!(payload
            .get("error")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
            .contains("age"));
    }

    #[tokio::test]
    async fn missing_client_is_not_found() {
        let router = api_router(test_state());
        let response = router
            .oneshot(request("GET", "/api/v1/clients/42", None))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn duplicate_case_assignment_conflicts() {
        let router = api_router(test_state());

        let response = router
            .clone()
            .oneshot(request("POST", "/api/v1/clients", Some(profile_json(30, true))))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::CREATED);

        let assignment = json!({ "case_worker_id": 7 });
        let response = router
            .clone()
            .oneshot(request(
                "POST",
                "/api/v1/clients/1/case-assignment",
                Some(assignment.clone()),
            ))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = router
            .oneshot(request(
                "POST",
                "/api/v1/clients/1/case-assignment",
                Some(assignment),
            ))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn recommendations_require_a_trained_model() {
        let router = api_router(test_state());
        let response = router
            .oneshot(request(
                "POST",
                "/api/v1/assessments/recommendations",
                Some(json!({ "client": profile_json(27, false) })),
            ))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn recommendations_rank_candidates_once_trained() {
        let state = test_state();
        let model = train(&trained_model_records()).expect("training succeeds");
        state.assessments.model_store().publish(model);
        let router = api_router(state);

        let response = router
            .oneshot(request(
                "POST",
                "/api/v1/assessments/recommendations",
                Some(json!({
                    "client": profile_json(27, false),
                    "max_simultaneous": 2,
                    "top_k": 3
                })),
            ))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::OK);
        let payload = read_json_body(response).await;
        let recommendations = payload
            .get("recommendations")
            .and_then(serde_json::Value::as_array)
            .expect("recommendations present");
        assert_eq!(recommendations.len(), 3);
        assert!(payload.get("baseline_probability").is_some());
    }

    #[tokio::test]
    async fn oversized_max_simultaneous_is_bad_request() {
        let state = test_state();
        let model = train(&trained_model_records()).expect("training succeeds");
        state.assessments.model_store().publish(model);
        let router = api_router(state);

        let response = router
            .oneshot(request(
                "POST",
                "/api/v1/assessments/recommendations",
                Some(json!({
                    "client": profile_json(27, false),
                    "max_simultaneous": 8
                })),
            ))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn delete_cascades_to_services() {
        let router = api_router(test_state());

        router
            .clone()
            .oneshot(request("POST", "/api/v1/clients", Some(profile_json(30, true))))
            .await
            .expect("route executes");
        router
            .clone()
            .oneshot(request(
                "POST",
                "/api/v1/clients/1/case-assignment",
                Some(json!({ "case_worker_id": 7 })),
            ))
            .await
            .expect("route executes");

        let response = router
            .clone()
            .oneshot(request("DELETE", "/api/v1/clients/1", None))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = router
            .oneshot(request("GET", "/api/v1/clients/1/services", None))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn service_updates_feed_success_rate_search() {
        let router = api_router(test_state());

        router
            .clone()
            .oneshot(request("POST", "/api/v1/clients", Some(profile_json(30, true))))
            .await
            .expect("route executes");
        router
            .clone()
            .oneshot(request(
                "POST",
                "/api/v1/clients/1/case-assignment",
                Some(json!({ "case_worker_id": 7 })),
            ))
            .await
            .expect("route executes");

        let update = json!({
            "statuses": { "employment_assistance": InterventionStatus::InProgress },
            "success_rate": 80
        });
        let response = router
            .clone()
            .oneshot(request("PUT", "/api/v1/clients/1/services/7", Some(update)))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::OK);

        let response = router
            .oneshot(request(
                "GET",
                "/api/v1/clients/search/success-rate/70",
                None,
            ))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::OK);
        let matches = read_json_body(response).await;
        assert_eq!(matches.as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn admin_routes_reject_unauthenticated_requests_when_tokens_set() {
        let auth = AuthState::from_config(&AuthConfig {
            admin_token: Some("admin-secret".to_string()),
            case_worker_token: Some("worker-secret".to_string()),
        });
        let router = api_router(test_state()).layer(Extension(auth));

        let response = router
            .clone()
            .oneshot(request("POST", "/api/v1/clients", Some(profile_json(27, false))))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let mut with_worker_token =
            request("POST", "/api/v1/clients", Some(profile_json(27, false)));
        with_worker_token.headers_mut().insert(
            axum::http::header::AUTHORIZATION,
            "Bearer worker-secret".parse().expect("header parses"),
        );
        let response = router
            .clone()
            .oneshot(with_worker_token)
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let mut with_admin_token =
            request("POST", "/api/v1/clients", Some(profile_json(27, false)));
        with_admin_token.headers_mut().insert(
            axum::http::header::AUTHORIZATION,
            "Bearer admin-secret".parse().expect("header parses"),
        );
        let response = router
            .oneshot(with_admin_token)
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn full_journey_from_intake_to_retraining() {
        let router = api_router(test_state());

        // Two clients with opposite trajectories give the trainer one record
        // of each label.
        for (employed, worker) in [(false, 1u64), (true, 2u64)] {
            router
                .clone()
                .oneshot(request(
                    "POST",
                    "/api/v1/clients",
                    Some(profile_json(30, employed)),
                ))
                .await
                .expect("route executes");
            router
                .clone()
                .oneshot(request(
                    "POST",
                    &format!("/api/v1/clients/{}/case-assignment", worker),
                    Some(json!({ "case_worker_id": worker })),
                ))
                .await
                .expect("route executes");
        }

        router
            .clone()
            .oneshot(request(
                "PUT",
                "/api/v1/clients/1/services/1",
                Some(json!({
                    "statuses": { "employment_assistance": "completed" }
                })),
            ))
            .await
            .expect("route executes");

        let outcomes = [
            ("/api/v1/clients/1/outcomes", true),
            ("/api/v1/clients/2/outcomes", false),
        ];
        for (uri, success) in outcomes {
            let response = router
                .clone()
                .oneshot(request(
                    "POST",
                    uri,
                    Some(json!({ "success": success, "recorded_on": "2026-06-01" })),
                ))
                .await
                .expect("route executes");
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let response = router
            .clone()
            .oneshot(request("POST", "/api/v1/model/retrain", None))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::OK);
        let payload = read_json_body(response).await;
        assert_eq!(payload.get("trained"), Some(&json!(true)));

        let response = router
            .clone()
            .oneshot(request("GET", "/api/v1/model", None))
            .await
            .expect("route executes");
        let payload = read_json_body(response).await;
        assert_eq!(payload.get("trained"), Some(&json!(true)));

        let response = router
            .oneshot(request(
                "POST",
                "/api/v1/assessments/recommendations",
                Some(json!({ "client": profile_json(27, false), "top_k": 5 })),
            ))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let router = api_router(test_state());
        let response = router
            .oneshot(request("GET", "/health", None))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::OK);
        let payload = read_json_body(response).await;
        assert_eq!(payload.get("status"), Some(&json!("ok")));
    }
}
