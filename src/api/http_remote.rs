//! Implements the `Remote` trait with `reqwest` against a REST collection.

use crate::api::{Remote, RemoteId, RemoteItem, RemotePayload};
use crate::Result;
use anyhow::{anyhow, bail, Context};
use reqwest::Response;
use tracing::trace;
use url::Url;

/// A REST collection at `base`, e.g. `https://example.mockapi.io/api/v1/transactions`.
pub(crate) struct HttpRemote {
    client: reqwest::Client,
    base: Url,
}

impl HttpRemote {
    pub(crate) fn new(base: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            base,
        }
    }

    /// `{base}/{id}`, regardless of whether `base` has a trailing slash.
    fn item_url(&self, id: &RemoteId) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("The sync URL '{}' cannot have a path", self.base))?
            .pop_if_empty()
            .push(id.as_str());
        Ok(url)
    }
}

#[async_trait::async_trait]
impl Remote for HttpRemote {
    async fn list(&mut self) -> Result<Vec<RemoteItem>> {
        trace!("GET {}", self.base);
        let response = self
            .client
            .get(self.base.clone())
            .send()
            .await
            .with_context(|| format!("Failed to send GET to {}", self.base))?;
        check_status(response, "GET", &self.base)
            .await?
            .json()
            .await
            .context("Failed to parse the remote collection")
    }

    async fn delete(&mut self, id: &RemoteId) -> Result<()> {
        let url = self.item_url(id)?;
        trace!("DELETE {url}");
        let response = self
            .client
            .delete(url.clone())
            .send()
            .await
            .with_context(|| format!("Failed to send DELETE to {url}"))?;
        check_status(response, "DELETE", &url).await?;
        Ok(())
    }

    async fn create(&mut self, payload: &RemotePayload) -> Result<()> {
        trace!("POST {} {payload:?}", self.base);
        let response = self
            .client
            .post(self.base.clone())
            .json(payload)
            .send()
            .await
            .with_context(|| format!("Failed to send POST to {}", self.base))?;
        check_status(response, "POST", &self.base).await?;
        Ok(())
    }
}

/// Turns a non-2xx response into an error that includes the body.
async fn check_status(response: Response, method: &str, url: &Url) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read response body".to_string());
    bail!("{method} {url} failed with status {status}: {body}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Path, State};
    use axum::http::StatusCode;
    use axum::routing::{delete, get};
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    type Items = Arc<Mutex<Vec<Value>>>;

    async fn list_items(State(items): State<Items>) -> Json<Vec<Value>> {
        Json(items.lock().unwrap().clone())
    }

    async fn create_item(State(items): State<Items>, Json(mut body): Json<Value>) -> StatusCode {
        let mut items = items.lock().unwrap();
        let next = items.len() + 100;
        body["id"] = json!(next.to_string());
        items.push(body);
        StatusCode::CREATED
    }

    async fn delete_item(State(items): State<Items>, Path(id): Path<String>) -> StatusCode {
        let mut items = items.lock().unwrap();
        let before = items.len();
        items.retain(|item| item["id"] != json!(id) && item["id"].to_string() != id);
        if items.len() == before {
            StatusCode::NOT_FOUND
        } else {
            StatusCode::OK
        }
    }

    /// Serves a REST collection at `/transactions` on a random local port.
    async fn serve(items: Items) -> Url {
        let app = Router::new()
            .route("/transactions", get(list_items).post(create_item))
            .route("/transactions/{id}", delete(delete_item))
            .with_state(items);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Url::parse(&format!("http://{addr}/transactions")).unwrap()
    }

    #[test]
    fn test_item_url() {
        let remote = HttpRemote::new(Url::parse("https://example.com/api/transactions").unwrap());
        let url = remote.item_url(&RemoteId::new("12")).unwrap();
        assert_eq!(url.as_str(), "https://example.com/api/transactions/12");

        let remote = HttpRemote::new(Url::parse("https://example.com/api/transactions/").unwrap());
        let url = remote.item_url(&RemoteId::new("12")).unwrap();
        assert_eq!(url.as_str(), "https://example.com/api/transactions/12");
    }

    #[tokio::test]
    async fn test_list_delete_create() {
        let items: Items = Arc::new(Mutex::new(vec![
            json!({"id": "1", "title": "old"}),
            json!({"id": 2, "title": "older"}),
        ]));
        let url = serve(items.clone()).await;
        let mut remote = HttpRemote::new(url);

        let listed = remote.list().await.unwrap();
        assert_eq!(
            listed,
            vec![
                RemoteItem {
                    id: RemoteId::new("1")
                },
                RemoteItem {
                    id: RemoteId::new("2")
                },
            ]
        );

        remote.delete(&RemoteId::new("1")).await.unwrap();
        remote.delete(&RemoteId::new("2")).await.unwrap();
        assert!(items.lock().unwrap().is_empty());

        let payload = RemotePayload {
            title: "Cà phê".to_string(),
            amount: 50000.0,
            transaction_type: crate::model::TransactionType::Expense,
            created_at: "2025-11-01 08:00:00".to_string(),
        };
        remote.create(&payload).await.unwrap();
        let stored = items.lock().unwrap().clone();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0]["title"], "Cà phê");
        assert_eq!(stored[0]["type"], "Chi");
        assert_eq!(stored[0]["createdAt"], "2025-11-01 08:00:00");
    }

    #[tokio::test]
    async fn test_error_status_is_an_error() {
        let items: Items = Arc::new(Mutex::new(Vec::new()));
        let url = serve(items).await;
        let mut remote = HttpRemote::new(url);

        let err = remote
            .delete(&RemoteId::new("missing"))
            .await
            .unwrap_err()
            .to_string();
        assert!(err.contains("404"), "{err}");
    }

    #[tokio::test]
    async fn test_connection_refused_is_an_error() {
        // Bind then drop to get a port that nothing listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let mut remote = HttpRemote::new(Url::parse(&format!("http://{addr}/x")).unwrap());
        assert!(remote.list().await.is_err());
    }
}
