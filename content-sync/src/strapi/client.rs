//! Paginated reader for Strapi collection endpoints (v4 and v5 response shapes).

use std::time::Duration;

use ai_llm_service::error_handler::make_snippet;
use reqwest::header;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::config::SyncConfig;
use crate::errors::{Result, SyncError};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// One CMS record with v4 `attributes` merged into the top level.
pub type StrapiRecord = Map<String, Value>;

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    data: Value,
    #[serde(default)]
    meta: Option<Meta>,
}

#[derive(Debug, Deserialize)]
struct Meta {
    pagination: Option<Pagination>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Pagination {
    page_count: Option<u32>,
}

pub struct StrapiClient {
    client: reqwest::Client,
    base: String,
    page_size: u32,
}

impl StrapiClient {
    pub fn new(cfg: &SyncConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        if let Some(token) = cfg.strapi_token.as_deref() {
            let value = header::HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| SyncError::Config(format!("invalid STRAPI_TOKEN: {e}")))?;
            headers.insert(header::AUTHORIZATION, value);
        }
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base: cfg.strapi_url.trim_end_matches('/').to_string(),
            page_size: cfg.page_size.max(1),
        })
    }

    /// Fetches every page of the collection at `path` (e.g. `/api/faqs`).
    ///
    /// Stops after `meta.pagination.pageCount` pages, or after the first page
    /// when the response carries no pagination metadata.
    pub async fn fetch_all(&self, path: &str) -> Result<Vec<StrapiRecord>> {
        let url = format!("{}/{}", self.base, path.trim_start_matches('/'));
        let mut out = Vec::new();
        let mut page = 1u32;

        loop {
            let resp = self
                .client
                .get(&url)
                .query(&[
                    ("pagination[page]", page.to_string()),
                    ("pagination[pageSize]", self.page_size.to_string()),
                ])
                .send()
                .await?;

            let status = resp.status();
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                return Err(SyncError::Status {
                    url,
                    status: status.as_u16(),
                    snippet: make_snippet(&body),
                });
            }

            let body: Page = resp
                .json()
                .await
                .map_err(|e| SyncError::Decode(format!("{url}: {e}")))?;
            let records = records_of(body.data)?;
            debug!(%url, page, records = records.len(), "fetched CMS page");
            let empty = records.is_empty();
            out.extend(records);

            let page_count = body
                .meta
                .and_then(|m| m.pagination)
                .and_then(|p| p.page_count)
                .unwrap_or(1);
            if empty || page >= page_count {
                break;
            }
            page += 1;
        }

        info!(%url, total = out.len(), "fetched CMS collection");
        Ok(out)
    }
}

/// Normalizes `data` (array, or single object for single types) into flat records.
fn records_of(data: Value) -> Result<Vec<StrapiRecord>> {
    match data {
        Value::Array(items) => items.into_iter().map(flatten_record).collect(),
        Value::Object(_) => Ok(vec![flatten_record(data)?]),
        Value::Null => Ok(Vec::new()),
        other => Err(SyncError::Decode(format!(
            "expected `data` array, got {}",
            kind(&other)
        ))),
    }
}

/// v4 `{id, attributes: {...}}` becomes `{id, ...}`; v5 records are already flat.
fn flatten_record(v: Value) -> Result<StrapiRecord> {
    let Value::Object(mut map) = v else {
        return Err(SyncError::Decode(format!(
            "expected record object, got {}",
            kind(&v)
        )));
    };
    if let Some(Value::Object(attrs)) = map.remove("attributes") {
        for (k, v) in attrs {
            map.entry(k).or_insert(v);
        }
    }
    Ok(map)
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn cfg(server: &MockServer) -> SyncConfig {
        let mut cfg = SyncConfig::new(server.uri());
        cfg.strapi_token = Some("secret".into());
        cfg.page_size = 2;
        cfg
    }

    #[tokio::test]
    async fn follows_pagination_and_flattens_v4_records() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/faqs"))
            .and(query_param("pagination[page]", "1"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    {"id": 1, "attributes": {"question": "Q1", "answer": "A1"}},
                    {"id": 2, "attributes": {"question": "Q2", "answer": "A2"}}
                ],
                "meta": {"pagination": {"page": 1, "pageSize": 2, "pageCount": 2, "total": 3}}
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/faqs"))
            .and(query_param("pagination[page]", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"id": 3, "documentId": "abc", "question": "Q3", "answer": "A3"}],
                "meta": {"pagination": {"page": 2, "pageSize": 2, "pageCount": 2, "total": 3}}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = StrapiClient::new(&cfg(&server)).unwrap();
        let records = client.fetch_all("/api/faqs").await.unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0]["question"], "Q1");
        assert_eq!(records[0]["id"], 1);
        assert!(!records[0].contains_key("attributes"));
        assert_eq!(records[2]["answer"], "A3");
    }

    #[tokio::test]
    async fn missing_pagination_means_single_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/company-infos"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"data": [{"id": 7, "title": "About"}]})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = StrapiClient::new(&cfg(&server)).unwrap();
        let records = client.fetch_all("api/company-infos").await.unwrap();
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn http_errors_carry_status_and_snippet() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden\nno token"))
            .mount(&server)
            .await;

        let client = StrapiClient::new(&cfg(&server)).unwrap();
        let err = client.fetch_all("/api/faqs").await.unwrap_err();
        match err {
            SyncError::Status {
                status, snippet, ..
            } => {
                assert_eq!(status, 403);
                assert_eq!(snippet, "Forbidden no token");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
