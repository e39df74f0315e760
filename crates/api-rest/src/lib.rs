//! # API REST
//!
//! REST API implementation for clinic intake.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - Staff API-key checks and REST-specific concerns (JSON, CSV downloads, CORS)
//!
//! Uses `api-shared` for wire types and `intake-core` for every operation.

#![warn(rust_2018_idioms)]

use api_shared::dto::{
    ExamFormReq, ExamRecordedRes, HealthRes, ListSubmissionsRes, SubmissionDetailRes,
    SubmissionRowRes, SubmitFormReq, SubmitFormRes, WhatsAppRes,
};
use api_shared::{validate_api_key, HealthService, API_KEY_HEADER};
use axum::{
    extract::{Path, Query, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use intake_core::{ErrorKind, IntakeError, IntakeService, SubmissionFilter, SubmissionStatus};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::{IntoParams, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

/// Application state shared across REST API handlers.
#[derive(Clone)]
pub struct AppState {
    service: Arc<IntakeService>,
    staff_api_key: Option<Arc<str>>,
}

impl AppState {
    /// `staff_api_key` of `None` leaves staff routes open, for local development.
    pub fn new(service: Arc<IntakeService>, staff_api_key: Option<String>) -> Self {
        Self {
            service,
            staff_api_key: staff_api_key
                .filter(|k| !k.trim().is_empty())
                .map(Arc::from),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        submit_form,
        list_submissions,
        get_submission,
        get_exam,
        record_exam,
        whatsapp_message,
        export_csv,
    ),
    components(schemas(
        HealthRes,
        SubmitFormReq,
        SubmitFormRes,
        SubmissionRowRes,
        ListSubmissionsRes,
        SubmissionDetailRes,
        ExamFormReq,
        ExamRecordedRes,
        WhatsAppRes,
    ))
)]
pub struct ApiDoc;

/// Build the full REST router: public routes, key-protected staff routes and Swagger UI.
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/submissions", post(submit_form));

    let staff = Router::new()
        .route("/submissions", get(list_submissions))
        .route("/submissions/:id", get(get_submission))
        .route("/submissions/:id/exam", get(get_exam).put(record_exam))
        .route("/submissions/:id/whatsapp", get(whatsapp_message))
        .route("/export", get(export_csv))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_staff_key,
        ));

    public
        .merge(staff)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn require_staff_key(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, (StatusCode, &'static str)> {
    if let Some(expected) = state.staff_api_key.as_deref() {
        let provided = headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok());
        if let Err(e) = validate_api_key(provided, expected) {
            tracing::warn!(path = %request.uri().path(), "staff request rejected: {}", e);
            return Err((StatusCode::UNAUTHORIZED, "Invalid or missing API key"));
        }
    }
    Ok(next.run(request).await)
}

/// Map a core error to a status code and the category's user-facing message.
fn error_response(operation: &str, e: IntakeError) -> (StatusCode, &'static str) {
    let kind = e.kind();
    let status = match kind {
        ErrorKind::Network => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::Authorization => StatusCode::FORBIDDEN,
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Backend => StatusCode::BAD_GATEWAY,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
    };
    tracing::error!("{} error ({}): {:?}", operation, kind.tag(), e);
    (status, kind.user_message())
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Case-insensitive match on name, room, id or context text.
    search: Option<String>,
    /// `YYYY-MM-DD` form date.
    date: Option<String>,
    /// Submission status wire value, e.g. `inProgress` or `completed`.
    status: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExportQuery {
    search: Option<String>,
    date: Option<String>,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for monitoring and load balancers.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    post,
    path = "/submissions",
    request_body = SubmitFormReq,
    responses(
        (status = 201, description = "Submission created", body = SubmitFormRes),
        (status = 400, description = "Missing required field"),
        (status = 503, description = "Records service unreachable")
    )
)]
/// Submit the public patient intake form.
#[axum::debug_handler]
async fn submit_form(
    State(state): State<AppState>,
    Json(req): Json<SubmitFormReq>,
) -> Result<(StatusCode, Json<SubmitFormRes>), (StatusCode, &'static str)> {
    match state.service.submit_form(&req.into()).await {
        Ok(id) => Ok((StatusCode::CREATED, Json(SubmitFormRes { id }))),
        Err(e) => Err(error_response("Submit form", e)),
    }
}

#[utoipa::path(
    get,
    path = "/submissions",
    params(ListQuery),
    responses(
        (status = 200, description = "Dashboard rows", body = ListSubmissionsRes),
        (status = 400, description = "Invalid date filter"),
        (status = 401, description = "Missing or invalid API key")
    )
)]
/// List submissions for the staff dashboard.
///
/// Rows keep gateway order. A `status` filter is passed to the gateway; `search` and `date`
/// are applied here.
#[axum::debug_handler]
async fn list_submissions(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListSubmissionsRes>, (StatusCode, &'static str)> {
    let filter = SubmissionFilter::new(query.search, query.date);
    let status = query
        .status
        .filter(|s| !s.trim().is_empty())
        .map(SubmissionStatus::from);

    match state.service.dashboard(&filter, status.as_ref()).await {
        Ok(rows) => Ok(Json(ListSubmissionsRes {
            submissions: rows.into_iter().map(SubmissionRowRes::from).collect(),
        })),
        Err(e) => Err(error_response("List submissions", e)),
    }
}

#[utoipa::path(
    get,
    path = "/submissions/{id}",
    params(("id" = u64, Path, description = "Submission id")),
    responses(
        (status = 200, description = "Display-ready submission", body = SubmissionDetailRes),
        (status = 404, description = "Submission not found")
    )
)]
#[axum::debug_handler]
async fn get_submission(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<SubmissionDetailRes>, (StatusCode, &'static str)> {
    match state.service.view(id).await {
        Ok(submission) => Ok(Json(SubmissionDetailRes { submission })),
        Err(e) => Err(error_response("Get submission", e)),
    }
}

#[utoipa::path(
    get,
    path = "/submissions/{id}/exam",
    params(("id" = u64, Path, description = "Submission id")),
    responses(
        (status = 200, description = "Exam form pre-filled from the submission", body = ExamFormReq),
        (status = 404, description = "Submission not found")
    )
)]
#[axum::debug_handler]
async fn get_exam(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<ExamFormReq>, (StatusCode, &'static str)> {
    match state.service.exam_prefill(id).await {
        Ok(update) => Ok(Json(update.into())),
        Err(e) => Err(error_response("Exam prefill", e)),
    }
}

#[utoipa::path(
    put,
    path = "/submissions/{id}/exam",
    params(("id" = u64, Path, description = "Submission id")),
    request_body = ExamFormReq,
    responses(
        (status = 200, description = "Examination recorded", body = ExamRecordedRes),
        (status = 400, description = "Invalid meeting date or time"),
        (status = 404, description = "Submission not found")
    )
)]
/// Record examination results and mark the submission completed.
#[axum::debug_handler]
async fn record_exam(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<ExamFormReq>,
) -> Result<Json<ExamRecordedRes>, (StatusCode, &'static str)> {
    match state.service.record_exam(id, &req.into()).await {
        Ok(record) => Ok(Json(ExamRecordedRes {
            id,
            status: record.submission_status.as_wire().to_string(),
        })),
        Err(e) => Err(error_response("Record exam", e)),
    }
}

#[utoipa::path(
    get,
    path = "/submissions/{id}/whatsapp",
    params(("id" = u64, Path, description = "Submission id")),
    responses(
        (status = 200, description = "Results message and deep link", body = WhatsAppRes),
        (status = 404, description = "Submission not found")
    )
)]
#[axum::debug_handler]
async fn whatsapp_message(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<WhatsAppRes>, (StatusCode, &'static str)> {
    match state.service.whatsapp(id).await {
        Ok(composed) => Ok(Json(composed.into())),
        Err(e) => Err(error_response("Compose message", e)),
    }
}

#[utoipa::path(
    get,
    path = "/export",
    params(ExportQuery),
    responses(
        (status = 200, description = "CSV attachment", content_type = "text/csv", body = String),
        (status = 204, description = "Nothing to export")
    )
)]
/// Download the filtered dashboard as CSV.
#[axum::debug_handler]
async fn export_csv(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, (StatusCode, &'static str)> {
    let filter = SubmissionFilter::new(query.search, query.date);
    match state.service.export(&filter).await {
        Ok(Some(csv)) => Ok((
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", csv.filename),
                ),
            ],
            csv.content,
        )
            .into_response()),
        Ok(None) => Ok(StatusCode::NO_CONTENT.into_response()),
        Err(e) => Err(error_response("Export", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request as HttpRequest;
    use http_body_util::BodyExt;
    use intake_core::{CoreConfig, InMemoryGateway};
    use tower::ServiceExt;

    fn app(staff_key: Option<&str>) -> Router {
        let service = IntakeService::new(
            Arc::new(CoreConfig::default()),
            Arc::new(InMemoryGateway::new()),
        );
        router(AppState::new(
            Arc::new(service),
            staff_key.map(str::to_string),
        ))
    }

    async fn send(app: &Router, request: HttpRequest<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.clone().oneshot(request).await.expect("infallible");
        let status = response.status();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("read body")
            .to_bytes()
            .to_vec();
        (status, body)
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> HttpRequest<Body> {
        HttpRequest::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    fn get(uri: &str) -> HttpRequest<Body> {
        HttpRequest::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request")
    }

    async fn submit(app: &Router, name: &str) -> u64 {
        let (status, body) = send(
            app,
            json_request(
                "POST",
                "/submissions",
                serde_json::json!({
                    "name": name,
                    "nationality": "UK",
                    "roomNumber": "12",
                    "whatsapp": "0812345678",
                    "symptoms": "headache"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let res: SubmitFormRes = serde_json::from_slice(&body).expect("json");
        res.id
    }

    #[tokio::test]
    async fn health_is_public() {
        let (status, body) = send(&app(Some("k")), get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        let res: HealthRes = serde_json::from_slice(&body).expect("json");
        assert!(res.ok);
    }

    #[tokio::test]
    async fn submit_then_list_and_view() {
        let app = app(None);
        let id = submit(&app, "Ana").await;

        let (status, body) = send(&app, get("/submissions?search=ana")).await;
        assert_eq!(status, StatusCode::OK);
        let list: ListSubmissionsRes = serde_json::from_slice(&body).expect("json");
        assert_eq!(list.submissions.len(), 1);
        assert_eq!(list.submissions[0].name, "Ana");
        assert_eq!(list.submissions[0].status, "In Progress");

        let (status, body) = send(&app, get(&format!("/submissions/{id}"))).await;
        assert_eq!(status, StatusCode::OK);
        let detail: serde_json::Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(detail["submission"]["personalInfo"]["roomNumber"], "12");
    }

    #[tokio::test]
    async fn blank_form_is_bad_request() {
        let app = app(None);
        let (status, _) = send(
            &app,
            json_request(
                "POST",
                "/submissions",
                serde_json::json!({
                    "name": " ",
                    "nationality": "UK",
                    "roomNumber": "12",
                    "whatsapp": "0812"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn staff_routes_require_key_when_configured() {
        let app = app(Some("secret"));
        submit(&app, "Ana").await;

        let (status, _) = send(&app, get("/submissions")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let request = HttpRequest::builder()
            .uri("/submissions")
            .header(API_KEY_HEADER, "secret")
            .body(Body::empty())
            .expect("request");
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_submission_is_not_found() {
        let (status, body) = send(&app(None), get("/submissions/77")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, ErrorKind::NotFound.user_message().as_bytes());
    }

    #[tokio::test]
    async fn exam_round_trip_completes_submission() {
        let app = app(None);
        let id = submit(&app, "Ana").await;

        let (status, body) = send(&app, get(&format!("/submissions/{id}/exam"))).await;
        assert_eq!(status, StatusCode::OK);
        let mut form: ExamFormReq = serde_json::from_slice(&body).expect("json");
        assert!(form.meet_doctor);
        form.blood_pressure = "120/80".into();

        let (status, body) = send(
            &app,
            json_request(
                "PUT",
                &format!("/submissions/{id}/exam"),
                serde_json::to_value(&form).expect("json"),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let res: ExamRecordedRes = serde_json::from_slice(&body).expect("json");
        assert_eq!(res.status, "completed");

        let (_, body) = send(&app, get("/submissions?status=completed")).await;
        let list: ListSubmissionsRes = serde_json::from_slice(&body).expect("json");
        assert_eq!(list.submissions.len(), 1);
        assert!(list.submissions[0].completed);

        let (_, body) = send(&app, get(&format!("/submissions/{id}/whatsapp"))).await;
        let composed: WhatsAppRes = serde_json::from_slice(&body).expect("json");
        assert!(composed.message.contains("• Blood Pressure: 120/80\n"));
        assert!(composed
            .link
            .is_some_and(|l| l.starts_with("https://wa.me/62812345678?text=")));
    }

    #[tokio::test]
    async fn export_returns_csv_or_no_content() {
        let app = app(None);

        let (status, body) = send(&app, get("/export")).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(body.is_empty());

        submit(&app, "Ana").await;
        let response = app.clone().oneshot(get("/export")).await.expect("infallible");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"Medical_Data_All.csv\""
        );
        let body = response
            .into_body()
            .collect()
            .await
            .expect("read body")
            .to_bytes();
        let text = String::from_utf8(body.to_vec()).expect("utf8");
        assert!(text.starts_with("ID,Name,Room,"));
        assert!(text.contains("\n1,Ana,12,UK,0812345678,\"headache\","));
    }

    #[tokio::test]
    async fn invalid_date_filter_is_bad_request() {
        let (status, _) = send(&app(None), get("/export?date=11-02-2025")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
