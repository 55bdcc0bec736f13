use crate::api::FetchError;
use crate::session::SessionContext;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    session: Arc<dyn SessionContext>,
}

impl ApiClient {
    pub fn new(session: Arc<dyn SessionContext>) -> Self {
        Self {
            client: reqwest::Client::new(),
            session,
        }
    }

    /// `<base_url>/<path>` with exactly one slash between them
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.session.base_url().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub async fn get_json(&self, path: &str) -> Result<Value, FetchError> {
        let url = self.url(path);
        debug!(target: "api", "GET {}", url);

        let mut request = self.client.get(&url);
        if let Some(token) = self.session.token() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(target: "api", "GET {} failed with {}", url, status);
            return Err(FetchError::Http {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }

    /// Fetch a list resource. The body is either the row array itself or an
    /// object holding it at `pointer` (a JSON pointer such as `/data/items`).
    pub async fn fetch_rows(
        &self,
        path: &str,
        pointer: Option<&str>,
    ) -> Result<Vec<Value>, FetchError> {
        let body = self.get_json(path).await?;
        let rows = extract_rows(body, pointer)?;
        debug!(target: "api", "{} returned {} rows", path, rows.len());
        Ok(rows)
    }
}

pub fn extract_rows(mut body: Value, pointer: Option<&str>) -> Result<Vec<Value>, FetchError> {
    let target = match pointer {
        Some(pointer) => body
            .pointer_mut(pointer)
            .map(Value::take)
            .ok_or_else(|| FetchError::NoRows(pointer.to_string()))?,
        None => body,
    };

    match target {
        Value::Array(rows) => Ok(rows),
        _ => Err(FetchError::NoRows(pointer.unwrap_or("").to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;
    use serde_json::json;

    #[test]
    fn test_url_joining() {
        let client = ApiClient::new(Arc::new(Session::new("https://fm.example.com/api/")));
        assert_eq!(
            client.url("/pms/assets.json"),
            "https://fm.example.com/api/pms/assets.json"
        );
        assert_eq!(
            client.url("company_setups.json"),
            "https://fm.example.com/api/company_setups.json"
        );
    }

    #[test]
    fn test_extract_rows() {
        let rows = extract_rows(json!([{"id": 1}, {"id": 2}]), None).unwrap();
        assert_eq!(rows.len(), 2);

        let nested = json!({"data": {"tickets": [{"id": "t1"}]}, "total": 1});
        let rows = extract_rows(nested.clone(), Some("/data/tickets")).unwrap();
        assert_eq!(rows[0]["id"], "t1");

        assert!(matches!(
            extract_rows(nested.clone(), Some("/data/missing")),
            Err(FetchError::NoRows(p)) if p == "/data/missing"
        ));
        assert!(matches!(extract_rows(nested, None), Err(FetchError::NoRows(_))));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_network_error() {
        let client = ApiClient::new(Arc::new(Session::new("http://127.0.0.1:1").with_token("t")));
        let err = client.fetch_rows("/rows.json", None).await.unwrap_err();
        assert!(matches!(err, FetchError::Network(_)));
    }
}
