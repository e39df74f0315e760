use super::Gateway;
use crate::error::{GatewayError, GatewayResult};
use crate::record::PatientRecord;
use crate::{IntakeError, IntakeResult};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;

/// JSON-over-HTTP client for the remote records service.
///
/// Wire mapping:
///
/// | Operation | Request |
/// |---|---|
/// | create | `POST /submissions` returning `{ "id": u64 }` |
/// | list | `GET /submissions` |
/// | list_filtered | `GET /submissions?filter=<tag>` |
/// | get_by_id | `GET /submissions/{id}`, `404` meaning absent |
/// | update | `PUT /submissions/{id}` |
#[derive(Clone, Debug)]
pub struct HttpGateway {
    base_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct CreatedId {
    id: u64,
}

impl HttpGateway {
    pub fn new(base_url: &str, token: Option<String>) -> IntakeResult<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        Url::parse(&base_url)
            .map_err(|e| IntakeError::Config(format!("invalid gateway url '{base_url}': {e}")))?;

        Ok(Self {
            base_url,
            token,
            client: reqwest::Client::new(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> GatewayResult<Response> {
        builder.send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                GatewayError::Unavailable(self.base_url.clone())
            } else {
                GatewayError::Rejected(e.to_string())
            }
        })
    }

    async fn fetch_list(&self, filter_tag: Option<&str>) -> GatewayResult<Vec<PatientRecord>> {
        let mut builder = self.request(Method::GET, "/submissions");
        if let Some(tag) = filter_tag {
            builder = builder.query(&[("filter", tag)]);
        }
        let response = check(self.send(builder).await?).await?;
        decode(response).await
    }

    async fn fetch_one(&self, id: u64) -> GatewayResult<Option<PatientRecord>> {
        let path = format!("/submissions/{id}");
        let response = self.send(self.request(Method::GET, &path)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        decode(check(response).await?).await.map(Some)
    }

    async fn put(&self, id: u64, record: PatientRecord) -> GatewayResult<()> {
        let path = format!("/submissions/{id}");
        let response = self
            .send(self.request(Method::PUT, &path).json(&record))
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(GatewayError::NotFound(id));
        }
        check(response).await.map(|_| ())
    }

    async fn post(&self, record: PatientRecord) -> GatewayResult<u64> {
        let response = self
            .send(self.request(Method::POST, "/submissions").json(&record))
            .await?;
        let created: CreatedId = decode(check(response).await?).await?;
        Ok(created.id)
    }
}

/// Turn a non-success status into the matching error category.
async fn check(response: Response) -> GatewayResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let detail = if body.is_empty() {
        status.to_string()
    } else {
        format!("{status}: {body}")
    };

    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GatewayError::Unauthorized(detail),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            GatewayError::Invalid(detail)
        }
        StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY => {
            GatewayError::Unavailable(detail)
        }
        _ => GatewayError::Rejected(detail),
    })
}

async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> GatewayResult<T> {
    response
        .json()
        .await
        .map_err(|e| GatewayError::Rejected(format!("unexpected response body: {e}")))
}

impl Gateway for HttpGateway {
    fn create(&self, record: PatientRecord) -> BoxFuture<'_, GatewayResult<u64>> {
        self.post(record).boxed()
    }

    fn list(&self) -> BoxFuture<'_, GatewayResult<Vec<PatientRecord>>> {
        self.fetch_list(None).boxed()
    }

    fn list_filtered<'a>(
        &'a self,
        filter_tag: &'a str,
    ) -> BoxFuture<'a, GatewayResult<Vec<PatientRecord>>> {
        self.fetch_list(Some(filter_tag)).boxed()
    }

    fn get_by_id(&self, id: u64) -> BoxFuture<'_, GatewayResult<Option<PatientRecord>>> {
        self.fetch_one(id).boxed()
    }

    fn update(&self, id: u64, record: PatientRecord) -> BoxFuture<'_, GatewayResult<()>> {
        self.put(id, record).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::SubmissionStatus;
    use axum::extract::{Path, Query};
    use axum::http::{HeaderMap, StatusCode as AxumStatus};
    use axum::routing::get;
    use axum::{Json, Router};
    use std::collections::HashMap;

    fn authorised(headers: &HeaderMap) -> bool {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            == Some("Bearer secret")
    }

    fn stored(id: u64, status: SubmissionStatus) -> PatientRecord {
        PatientRecord {
            id,
            clinic_id: "apsp".into(),
            submission_status: status,
            ..Default::default()
        }
    }

    async fn list_handler(
        Query(params): Query<HashMap<String, String>>,
    ) -> Json<Vec<PatientRecord>> {
        let all = vec![
            stored(1, SubmissionStatus::InProgress),
            stored(2, SubmissionStatus::Completed),
        ];
        let filtered = match params.get("filter") {
            Some(tag) => all
                .into_iter()
                .filter(|r| r.submission_status.as_wire() == tag)
                .collect(),
            None => all,
        };
        Json(filtered)
    }

    async fn create_handler(
        headers: HeaderMap,
        Json(record): Json<PatientRecord>,
    ) -> Result<Json<serde_json::Value>, (AxumStatus, &'static str)> {
        if !authorised(&headers) {
            return Err((AxumStatus::UNAUTHORIZED, "missing token"));
        }
        if record.clinic_id.is_empty() {
            return Err((AxumStatus::BAD_REQUEST, "clinicId is required"));
        }
        Ok(Json(serde_json::json!({ "id": 42 })))
    }

    async fn get_handler(Path(id): Path<u64>) -> Result<Json<PatientRecord>, AxumStatus> {
        match id {
            1 => Ok(Json(stored(1, SubmissionStatus::InProgress))),
            500 => Err(AxumStatus::INTERNAL_SERVER_ERROR),
            _ => Err(AxumStatus::NOT_FOUND),
        }
    }

    async fn put_handler(Path(id): Path<u64>, Json(_record): Json<PatientRecord>) -> AxumStatus {
        if id == 1 {
            AxumStatus::NO_CONTENT
        } else {
            AxumStatus::NOT_FOUND
        }
    }

    async fn spawn_stub() -> String {
        let app = Router::new()
            .route("/submissions", get(list_handler).post(create_handler))
            .route("/submissions/:id", get(get_handler).put(put_handler));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub");
        let addr = listener.local_addr().expect("stub addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn create_sends_bearer_token() {
        let base = spawn_stub().await;

        let authed = HttpGateway::new(&base, Some("secret".into())).expect("client");
        let id = authed
            .create(stored(0, SubmissionStatus::InProgress))
            .await
            .expect("create");
        assert_eq!(id, 42);

        let anonymous = HttpGateway::new(&base, None).expect("client");
        let err = anonymous
            .create(stored(0, SubmissionStatus::InProgress))
            .await
            .expect_err("no token");
        assert!(matches!(err, GatewayError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn bad_request_maps_to_invalid() {
        let base = spawn_stub().await;
        let gateway = HttpGateway::new(&base, Some("secret".into())).expect("client");
        let mut record = stored(0, SubmissionStatus::InProgress);
        record.clinic_id.clear();
        let err = gateway.create(record).await.expect_err("empty clinic");
        assert!(matches!(err, GatewayError::Invalid(msg) if msg.contains("clinicId")));
    }

    #[tokio::test]
    async fn lists_with_and_without_filter() {
        let base = spawn_stub().await;
        let gateway = HttpGateway::new(&base, None).expect("client");

        assert_eq!(gateway.list().await.expect("list").len(), 2);
        let completed = gateway.list_filtered("completed").await.expect("filtered");
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].id, 2);
    }

    #[tokio::test]
    async fn get_maps_404_to_none() {
        let base = spawn_stub().await;
        let gateway = HttpGateway::new(&base, None).expect("client");

        assert!(gateway.get_by_id(1).await.expect("get").is_some());
        assert_eq!(gateway.get_by_id(7).await.expect("get"), None);
        let err = gateway.get_by_id(500).await.expect_err("server error");
        assert!(matches!(err, GatewayError::Rejected(_)));
    }

    #[tokio::test]
    async fn update_of_unknown_id_is_not_found() {
        let base = spawn_stub().await;
        let gateway = HttpGateway::new(&base, None).expect("client");

        gateway
            .update(1, stored(1, SubmissionStatus::Completed))
            .await
            .expect("update");
        let err = gateway
            .update(8, stored(8, SubmissionStatus::Completed))
            .await
            .expect_err("missing");
        assert!(matches!(err, GatewayError::NotFound(8)));
    }

    #[tokio::test]
    async fn unreachable_backend_is_unavailable() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);

        let gateway = HttpGateway::new(&format!("http://{addr}"), None).expect("client");
        let err = gateway.list().await.expect_err("nothing listening");
        assert!(matches!(err, GatewayError::Unavailable(_)));
        assert_eq!(err.kind().tag(), "network");
    }

    #[test]
    fn rejects_unparseable_base_url() {
        assert!(matches!(
            HttpGateway::new("not a url", None),
            Err(IntakeError::Config(_))
        ));
        let gateway = HttpGateway::new("http://records.local/", None).expect("valid");
        assert_eq!(gateway.base_url(), "http://records.local");
    }
}
