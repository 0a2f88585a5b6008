use async_trait::async_trait;
use kidsafe_application::ports::RemoteStore;
use kidsafe_domain::DomainError;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// Firebase Realtime Database over its REST API: `GET`/`PUT
/// {base}/{path}.json`, authenticated with the `auth` query parameter.
pub struct FirebaseRestStore {
    client: Client,
    base_url: Url,
    auth_token: Option<String>,
}

impl FirebaseRestStore {
    pub fn new(
        database_url: &str,
        auth_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, DomainError> {
        let base_url = Url::parse(database_url.trim_end_matches('/'))
            .map_err(|e| DomainError::ConfigError(format!("Invalid database URL: {}", e)))?;

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("kidsafe-agent/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DomainError::ConfigError(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            auth_token: auth_token.filter(|t| !t.is_empty()),
        })
    }

    /// REST URL of `path`, without the auth parameter.
    pub fn document_url(&self, path: &str) -> Result<Url, DomainError> {
        let path = path.trim_matches('/');
        let joined = format!("{}/{}.json", self.base_url.as_str().trim_end_matches('/'), path);
        Url::parse(&joined).map_err(|e| DomainError::RemoteFetch {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }

    fn authorized(&self, mut url: Url) -> Url {
        if let Some(token) = &self.auth_token {
            url.query_pairs_mut().append_pair("auth", token);
        }
        url
    }

    fn fetch_error(path: &str, reason: impl ToString) -> DomainError {
        DomainError::RemoteFetch {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl RemoteStore for FirebaseRestStore {
    #[instrument(skip(self))]
    async fn get(&self, path: &str) -> Result<Option<Value>, DomainError> {
        let url = self.authorized(self.document_url(path)?);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Self::fetch_error(path, e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::fetch_error(path, format!("HTTP {}: {}", status, body.trim())));
        }

        let value: Value = response
            .json()
            .await
            .map_err(|e| DomainError::RemoteDecode(format!("{}: {}", path, e)))?;

        debug!(path, null = value.is_null(), "Remote document fetched");
        Ok((!value.is_null()).then_some(value))
    }

    #[instrument(skip(self, value))]
    async fn set(&self, path: &str, value: &Value) -> Result<(), DomainError> {
        let url = self.authorized(self.document_url(path)?);

        let response = self
            .client
            .put(url)
            .json(value)
            .send()
            .await
            .map_err(|e| Self::fetch_error(path, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::fetch_error(path, format!("HTTP {}: {}", status, body.trim())));
        }

        debug!(path, "Remote document written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(token: Option<&str>) -> FirebaseRestStore {
        FirebaseRestStore::new(
            "https://kidsafe-demo.firebaseio.com/",
            token.map(str::to_string),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn document_url_appends_json_suffix() {
        let url = store(None).document_url("/kidsafe/families/abc/blockedUrls/").unwrap();
        assert_eq!(
            url.as_str(),
            "https://kidsafe-demo.firebaseio.com/kidsafe/families/abc/blockedUrls.json"
        );
    }

    #[test]
    fn auth_token_goes_into_query() {
        let s = store(Some("secret"));
        let url = s.authorized(s.document_url("blockedUrls").unwrap());
        assert_eq!(url.query(), Some("auth=secret"));
    }

    #[test]
    fn empty_token_is_ignored() {
        let s = store(Some(""));
        let url = s.authorized(s.document_url("blockedUrls").unwrap());
        assert_eq!(url.query(), None);
    }

    #[test]
    fn rejects_invalid_base_url() {
        assert!(FirebaseRestStore::new("not a url", None, Duration::from_secs(1)).is_err());
    }
}
