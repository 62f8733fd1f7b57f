// Device API HTTP client
//
// Wraps `reqwest::Client` with base-URL normalization, bearer-token
// injection and uniform response handling. Endpoint methods live in
// `devices.rs` to keep this module focused on transport mechanics.

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

// ── Error response shape ─────────────────────────────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the remote device API.
///
/// All paths are resolved against a base URL that always ends in `/`,
/// so `https://hub.local/api` and `https://hub.local/api/` behave the same.
pub struct DeviceClient {
    http: reqwest::Client,
    base_url: Url,
}

impl DeviceClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client from a base URL, an optional bearer token, and a
    /// transport config.
    pub fn new(
        base_url: &str,
        token: Option<&SecretString>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|e| Error::InvalidToken(e.to_string()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = transport.build_client_with_headers(headers)?;
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// The normalized base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Join a relative path (e.g. `"devices"`) onto the base URL.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    /// `{base}/devices/{id}` with the id percent-encoded as one segment.
    pub(crate) fn device_url(&self, id: &str) -> Result<Url, Error> {
        let mut url = self.url("devices")?;
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .push(id);
        Ok(url)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        self.handle_response(resp).await
    }

    pub(crate) async fn patch_no_response<B: Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<(), Error> {
        debug!("PATCH {url}");

        let resp = self.http.patch(url).json(body).send().await?;
        self.handle_empty(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn handle_empty(&self, resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn parse_error(&self, status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Error::Unauthorized;
        }

        let raw = resp.text().await.unwrap_or_default();

        let message = match serde_json::from_str::<ErrorResponse>(&raw) {
            Ok(err) => err.message.or(err.error),
            Err(_) => None,
        }
        .unwrap_or_else(|| {
            if raw.is_empty() {
                status.to_string()
            } else {
                raw
            }
        });

        Error::Api {
            status: status.as_u16(),
            message,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> DeviceClient {
        DeviceClient::from_reqwest(base, reqwest::Client::new()).unwrap()
    }

    #[test]
    fn base_url_gains_trailing_slash() {
        assert_eq!(client("http://hub.local/api").base_url().as_str(), "http://hub.local/api/");
        assert_eq!(client("http://hub.local/api/").base_url().as_str(), "http://hub.local/api/");
        assert_eq!(client("http://hub.local").base_url().as_str(), "http://hub.local/");
    }

    #[test]
    fn device_url_encodes_id_as_single_segment() {
        let c = client("http://hub.local/api");
        assert_eq!(
            c.device_url("kitchen/lamp 1").unwrap().as_str(),
            "http://hub.local/api/devices/kitchen%2Flamp%201"
        );
    }

    #[test]
    fn rejects_garbage_base_url() {
        assert!(matches!(
            DeviceClient::from_reqwest("not a url", reqwest::Client::new()),
            Err(Error::InvalidUrl(_))
        ));
    }
}
