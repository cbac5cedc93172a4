use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use super::domain::{
    ApplicationId, ApplicationState, CreditAssessmentView, LoanApplicationInput,
    LoanApplicationView,
};
use super::repository::LoanApplicationRepository;
use super::service::{ApplicationServiceError, AssessmentOutcome, LoanApplicationService};

/// Envelope shared by every loan application endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Payload of a successful assessment call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentView {
    pub application: LoanApplicationView,
    pub assessment_result: CreditAssessmentView,
}

impl From<AssessmentOutcome> for AssessmentView {
    fn from(outcome: AssessmentOutcome) -> Self {
        Self {
            application: outcome.application.to_view(),
            assessment_result: outcome.result.to_view(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListQuery {
    pub(crate) state: Option<ApplicationState>,
}

/// Router builder exposing the loan application REST surface.
pub fn application_router<R>(service: Arc<LoanApplicationService<R>>) -> Router
where
    R: LoanApplicationRepository + 'static,
{
    Router::new()
        .route(
            "/api/applications",
            post(create_handler::<R>).get(list_handler::<R>),
        )
        .route("/api/applications/:id", get(get_handler::<R>))
        .route("/api/applications/:id/assess", post(assess_handler::<R>))
        .route("/api/applications/:id/approve", post(approve_handler::<R>))
        .route("/api/applications/:id/reject", post(reject_handler::<R>))
        .with_state(service)
}

fn success<T: Serialize>(status: StatusCode, data: T) -> Response {
    (status, Json(ApiResponse::ok(data))).into_response()
}

fn failure(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ApiResponse::failure(message))).into_response()
}

pub(crate) fn error_response(err: ApplicationServiceError) -> Response {
    match &err {
        ApplicationServiceError::Validation(_) | ApplicationServiceError::Transition(_) => {
            failure(StatusCode::BAD_REQUEST, err.to_string())
        }
        ApplicationServiceError::NotFound(_) => failure(StatusCode::NOT_FOUND, err.to_string()),
        ApplicationServiceError::Repository { .. } => {
            error!(error = %err, "loan application storage failure");
            failure(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

/// Runs a service call on the blocking pool; storage adapters may touch the filesystem.
async fn run_blocking<R, T, F>(
    service: Arc<LoanApplicationService<R>>,
    work: F,
) -> Result<T, Response>
where
    R: LoanApplicationRepository + 'static,
    T: Send + 'static,
    F: FnOnce(&LoanApplicationService<R>) -> Result<T, ApplicationServiceError> + Send + 'static,
{
    match tokio::task::spawn_blocking(move || work(&service)).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(error_response(err)),
        Err(join_error) => {
            error!(error = %join_error, "loan application request aborted");
            Err(failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
            ))
        }
    }
}

pub(crate) async fn create_handler<R>(
    State(service): State<Arc<LoanApplicationService<R>>>,
    payload: Result<Json<LoanApplicationInput>, JsonRejection>,
) -> Response
where
    R: LoanApplicationRepository + 'static,
{
    let Json(input) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return failure(StatusCode::BAD_REQUEST, rejection.body_text()),
    };

    match run_blocking(service, move |service| service.create(input)).await {
        Ok(application) => success(StatusCode::CREATED, application.to_view()),
        Err(response) => response,
    }
}

pub(crate) async fn list_handler<R>(
    State(service): State<Arc<LoanApplicationService<R>>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Response
where
    R: LoanApplicationRepository + 'static,
{
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return failure(StatusCode::BAD_REQUEST, rejection.body_text()),
    };

    match run_blocking(service, move |service| service.list(query.state)).await {
        Ok(applications) => {
            let views: Vec<LoanApplicationView> =
                applications.iter().map(|application| application.to_view()).collect();
            success(StatusCode::OK, views)
        }
        Err(response) => response,
    }
}

pub(crate) async fn get_handler<R>(
    State(service): State<Arc<LoanApplicationService<R>>>,
    Path(id): Path<String>,
) -> Response
where
    R: LoanApplicationRepository + 'static,
{
    let id = ApplicationId(id);
    match run_blocking(service, move |service| service.get(&id)).await {
        Ok(application) => success(StatusCode::OK, application.to_view()),
        Err(response) => response,
    }
}

pub(crate) async fn assess_handler<R>(
    State(service): State<Arc<LoanApplicationService<R>>>,
    Path(id): Path<String>,
) -> Response
where
    R: LoanApplicationRepository + 'static,
{
    let id = ApplicationId(id);
    match run_blocking(service, move |service| service.assess(&id)).await {
        Ok(outcome) => success(StatusCode::OK, AssessmentView::from(outcome)),
        Err(response) => response,
    }
}

pub(crate) async fn approve_handler<R>(
    State(service): State<Arc<LoanApplicationService<R>>>,
    Path(id): Path<String>,
) -> Response
where
    R: LoanApplicationRepository + 'static,
{
    let id = ApplicationId(id);
    match run_blocking(service, move |service| service.approve(&id)).await {
        Ok(application) => success(StatusCode::OK, application.to_view()),
        Err(response) => response,
    }
}

pub(crate) async fn reject_handler<R>(
    State(service): State<Arc<LoanApplicationService<R>>>,
    Path(id): Path<String>,
) -> Response
where
    R: LoanApplicationRepository + 'static,
{
    let id = ApplicationId(id);
    match run_blocking(service, move |service| service.reject(&id)).await {
        Ok(application) => success(StatusCode::OK, application.to_view()),
        Err(response) => response,
    }
}
