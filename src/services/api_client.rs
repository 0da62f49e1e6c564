use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use reqwest::{Client, Method};
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::services::session_service::SessionStore;

/// Where the backend lives. A persisted override (demo convenience) wins
/// over the configured `API_URL`.
#[derive(Clone, Debug)]
pub struct EndpointStore {
    default_url: Option<String>,
    override_file: Option<PathBuf>,
    current: Arc<Mutex<Option<String>>>,
}

impl EndpointStore {
    pub fn new(default_url: Option<String>, override_file: Option<PathBuf>) -> Self {
        Self {
            default_url: default_url.filter(|url| !url.trim().is_empty()),
            override_file,
            current: Arc::new(Mutex::new(None)),
        }
    }

    pub fn fixed(url: impl Into<String>) -> Self {
        Self::new(Some(url.into()), None)
    }

    /// Re-read on every request so an override written by another process
    /// takes effect on the next call.
    pub fn resolve(&self) -> Result<String> {
        if let Some(path) = &self.override_file {
            if let Ok(raw) = fs::read_to_string(path) {
                let raw = raw.trim();
                if !raw.is_empty() {
                    return Ok(raw.to_string());
                }
            }
        }

        let current = self
            .current
            .lock()
            .expect("endpoint store mutex poisoned")
            .clone();
        current
            .or_else(|| self.default_url.clone())
            .ok_or_else(|| Error::Config("No API base URL configured (set API_URL)".to_string()))
    }

    pub fn set_base_url(&self, raw: &str) -> Result<String> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(Error::Config("Please provide a valid address".to_string()));
        }
        let candidate = if raw.contains("://") {
            raw.to_string()
        } else {
            format!("http://{}", raw)
        };
        let parsed = Url::parse(&candidate)
            .map_err(|e| Error::Config(format!("Invalid API address '{}': {}", raw, e)))?;
        if parsed.host_str().is_none() {
            return Err(Error::Config(format!("Invalid API address '{}': missing host", raw)));
        }
        let normalized = parsed.as_str().trim_end_matches('/').to_string();

        if let Some(path) = &self.override_file {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, &normalized)?;
        }
        *self.current.lock().expect("endpoint store mutex poisoned") = Some(normalized.clone());
        info!(base_url = %normalized, "API base URL updated");
        Ok(normalized)
    }

    pub fn clear_override(&self) -> Result<()> {
        if let Some(path) = &self.override_file {
            if path.exists() {
                fs::remove_file(path)?;
            }
        }
        *self.current.lock().expect("endpoint store mutex poisoned") = None;
        Ok(())
    }
}

/// The one outgoing pipeline: every request resolves the base endpoint and
/// carries the session bearer token when there is one.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    endpoint: EndpointStore,
    session: SessionStore,
}

impl ApiClient {
    pub fn new(endpoint: EndpointStore, session: SessionStore) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            session,
        }
    }

    /// `timeout_secs == 0` keeps reqwest's default of no timeout.
    pub fn with_timeout(endpoint: EndpointStore, session: SessionStore, timeout_secs: u64) -> Result<Self> {
        let mut builder = Client::builder();
        if timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(timeout_secs));
        }
        Ok(Self {
            client: builder.build()?,
            endpoint,
            session,
        })
    }

    pub fn endpoint(&self) -> &EndpointStore {
        &self.endpoint
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub async fn get(&self, path: &str) -> Result<JsonValue> {
        self.send::<()>(Method::GET, path, None).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<JsonValue> {
        self.send(Method::POST, path, Some(body)).await
    }

    pub async fn post_empty(&self, path: &str) -> Result<JsonValue> {
        self.send::<()>(Method::POST, path, None).await
    }

    pub async fn patch<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<JsonValue> {
        self.send(Method::PATCH, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<JsonValue> {
        self.send::<()>(Method::DELETE, path, None).await
    }

    fn url_for(&self, path: &str) -> Result<Url> {
        let base = self.endpoint.resolve()?;
        let joined = format!(
            "{}/{}",
            base.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&joined).map_err(|e| Error::Config(format!("Invalid request URL '{}': {}", joined, e)))
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<JsonValue> {
        let url = self.url_for(path)?;
        debug!(%method, %url, "Sending API request");

        let mut request = self.client.request(method.clone(), url);
        if let Some(token) = self.session.get_token() {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            warn!(%method, path, status = status.as_u16(), "API request rejected");
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body: text,
            });
        }

        if text.trim().is_empty() {
            return Ok(JsonValue::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_base_url_adds_scheme_and_trims_slash() {
        let store = EndpointStore::new(None, None);
        assert!(store.resolve().is_err());
        let url = store.set_base_url(" 127.0.0.1:8000/ ").unwrap();
        assert_eq!(url, "http://127.0.0.1:8000");
        assert_eq!(store.resolve().unwrap(), "http://127.0.0.1:8000");
    }

    #[test]
    fn set_base_url_rejects_blank_and_garbage() {
        let store = EndpointStore::fixed("http://api.local");
        assert!(matches!(store.set_base_url("   "), Err(Error::Config(_))));
        assert!(matches!(store.set_base_url("http://"), Err(Error::Config(_))));
        assert_eq!(store.resolve().unwrap(), "http://api.local");
    }

    #[test]
    fn override_file_wins_over_default() {
        let dir = std::env::temp_dir().join(format!("jobboard-endpoint-{}", std::process::id()));
        let file = dir.join("api_base_url");
        let store = EndpointStore::new(Some("http://from-env:3000".into()), Some(file.clone()));
        assert_eq!(store.resolve().unwrap(), "http://from-env:3000");

        store.set_base_url("10.0.0.5:9000").unwrap();
        let other = EndpointStore::new(Some("http://from-env:3000".into()), Some(file));
        assert_eq!(other.resolve().unwrap(), "http://10.0.0.5:9000");

        other.clear_override().unwrap();
        store.clear_override().unwrap();
        assert_eq!(store.resolve().unwrap(), "http://from-env:3000");
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn joins_paths_under_base_prefix() {
        let client = ApiClient::new(EndpointStore::fixed("http://api.local/v1/"), SessionStore::detached());
        let url = client.url_for("/jobs/search").unwrap();
        assert_eq!(url.as_str(), "http://api.local/v1/jobs/search");
    }
}
