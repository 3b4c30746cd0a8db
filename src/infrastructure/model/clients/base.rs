//! Shared HTTP plumbing for provider transports.

use crate::infrastructure::model::types::LlmError;
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Normalize a base URL so it ends in `/v1` exactly once, stripping trailing
/// slashes first.
pub(crate) fn normalize_v1_base_url(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.ends_with("/v1") {
        trimmed.to_string()
    } else {
        format!("{trimmed}/v1")
    }
}

#[derive(Clone)]
pub(crate) struct HttpTransport {
    pub id: &'static str,
    pub base_url: String,
    http: Client,
}

impl HttpTransport {
    pub fn new(id: &'static str, base_url: String) -> Self {
        Self {
            id,
            base_url,
            http: Client::new(),
        }
    }

    /// Post JSON with bearer auth, decoding the JSON reply.
    pub async fn post_with_bearer<Req, Res>(
        &self,
        path: &str,
        api_key: &str,
        body: &Req,
    ) -> Result<Res, LlmError>
    where
        Req: Serialize,
        Res: DeserializeOwned,
    {
        self.http
            .post(format!("{}{path}", self.base_url))
            .bearer_auth(api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| LlmError::upstream(self.id, e))?
            .error_for_status()
            .map_err(|e| LlmError::upstream(self.id, e))?
            .json()
            .await
            .map_err(|e| LlmError::upstream(self.id, e))
    }

    /// Post JSON with header-based auth (the Anthropic scheme).
    pub async fn post_with_headers<Req, Res>(
        &self,
        path: &str,
        headers: &[(&'static str, &str)],
        body: &Req,
    ) -> Result<Res, LlmError>
    where
        Req: Serialize,
        Res: DeserializeOwned,
    {
        let mut request = self.http.post(format!("{}{path}", self.base_url));
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        request
            .json(body)
            .send()
            .await
            .map_err(|e| LlmError::upstream(self.id, e))?
            .error_for_status()
            .map_err(|e| LlmError::upstream(self.id, e))?
            .json()
            .await
            .map_err(|e| LlmError::upstream(self.id, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_v1_to_bare_host() {
        assert_eq!(
            normalize_v1_base_url("http://host:8000"),
            "http://host:8000/v1"
        );
    }

    #[test]
    fn strips_trailing_slash_before_appending() {
        assert_eq!(
            normalize_v1_base_url("http://host:8000/"),
            "http://host:8000/v1"
        );
    }

    #[test]
    fn leaves_existing_v1_suffix_alone() {
        assert_eq!(
            normalize_v1_base_url("http://host:8000/v1"),
            "http://host:8000/v1"
        );
    }

    #[test]
    fn strips_slash_after_v1() {
        assert_eq!(
            normalize_v1_base_url("http://host:8000/v1/"),
            "http://host:8000/v1"
        );
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(
            normalize_v1_base_url("  http://host:8000// "),
            "http://host:8000/v1"
        );
    }
}
