//! Reqwest-backed implementation of the resource client.

use color_eyre::{eyre::eyre, Result};
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::config::Config;
use crate::error::ResourceError;
use crate::resource::Resource;
use crate::session::SessionHandle;

use super::api_types::{ErrorBody, ListEnvelope};
use super::ResourceClient;

/// Page size for the list fetch loop.
const LIST_PAGE_SIZE: u64 = 50;

/// REST client for the dashboard backend.
///
/// Routes are derived from the resource type name: `GET {base}/{type}` for
/// collections, `{base}/{type}/{id}` for single entities. The bearer token
/// is read from the session context on every request, so a re-login is
/// picked up without rebuilding the client.
#[derive(Clone)]
pub struct RestClient {
  http: reqwest::Client,
  base: Url,
  session: SessionHandle,
}

impl RestClient {
  pub fn new(config: &Config, session: SessionHandle) -> Result<Self> {
    let http = reqwest::Client::builder()
      .timeout(Duration::from_secs(config.backend.timeout_secs))
      .build()
      .map_err(|e| eyre!("Failed to build HTTP client: {}", e))?;

    let mut base = Url::parse(&config.backend.url)
      .map_err(|e| eyre!("Invalid backend URL {}: {}", config.backend.url, e))?;
    // Url::join treats a path without a trailing slash as a file.
    if !base.path().ends_with('/') {
      base.set_path(&format!("{}/", base.path()));
    }

    Ok(Self {
      http,
      base,
      session,
    })
  }

  fn endpoint(&self, path: &str) -> Result<Url, ResourceError> {
    self
      .base
      .join(path)
      .map_err(|e| ResourceError::Network(format!("invalid endpoint {}: {}", path, e)))
  }

  fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
    let builder = self.http.request(method, url);
    match self.session.current().token {
      Some(token) => builder.bearer_auth(token),
      None => builder,
    }
  }

  /// Send a request, mapping transport failures to `Network` and
  /// non-success responses to `Server`.
  async fn send(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response, ResourceError> {
    let response = builder.send().await.map_err(map_transport_error)?;

    let status = response.status();
    if status.is_success() {
      return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ResourceError::Server {
      status: status.as_u16(),
      message: server_error_message(status.as_u16(), &body),
    })
  }

  async fn decode<D: serde::de::DeserializeOwned>(
    response: reqwest::Response,
  ) -> Result<D, ResourceError> {
    response
      .json()
      .await
      .map_err(|e| ResourceError::Network(format!("invalid response body: {}", e)))
  }
}

fn map_transport_error(e: reqwest::Error) -> ResourceError {
  if e.is_timeout() {
    ResourceError::Network("request timed out".to_string())
  } else {
    ResourceError::Network(e.to_string())
  }
}

/// The backend's own message when it sent one, else a generic message.
fn server_error_message(status: u16, body: &str) -> String {
  serde_json::from_str::<ErrorBody>(body)
    .ok()
    .and_then(|b| b.message)
    .filter(|m| !m.trim().is_empty())
    .unwrap_or_else(|| format!("request failed with status {}", status))
}

impl<T: Resource> ResourceClient<T> for RestClient {
  async fn list(&self) -> Result<Vec<T>, ResourceError> {
    let mut all = Vec::new();
    let mut offset = 0u64;

    loop {
      let mut url = self.endpoint(T::resource_type())?;
      url
        .query_pairs_mut()
        .append_pair("offset", &offset.to_string())
        .append_pair("limit", &LIST_PAGE_SIZE.to_string());

      let response = self.send(self.request(reqwest::Method::GET, url)).await?;
      let page: ListEnvelope<T> = Self::decode(response).await?;

      let count = page.items.len() as u64;
      all.extend(page.items);

      // Servers that ignore paging report total == 0 and send everything.
      if count == 0 || offset + count >= page.total {
        break;
      }
      offset += count;
    }

    debug!(resource = T::resource_type(), count = all.len(), "fetched collection");
    Ok(all)
  }

  async fn get(&self, id: &str) -> Result<T, ResourceError> {
    let url = self.endpoint(&format!("{}/{}", T::resource_type(), id))?;
    let response = self.send(self.request(reqwest::Method::GET, url)).await?;
    Self::decode(response).await
  }

  async fn create(&self, draft: &T) -> Result<T, ResourceError> {
    let url = self.endpoint(T::resource_type())?;
    let response = self
      .send(self.request(reqwest::Method::POST, url).json(draft))
      .await?;
    Self::decode(response).await
  }

  async fn update(&self, id: &str, patch: &T::Patch) -> Result<T, ResourceError> {
    let url = self.endpoint(&format!("{}/{}", T::resource_type(), id))?;
    let response = self
      .send(self.request(reqwest::Method::PATCH, url).json(patch))
      .await?;
    Self::decode(response).await
  }

  async fn delete(&self, id: &str) -> Result<(), ResourceError> {
    let url = self.endpoint(&format!("{}/{}", T::resource_type(), id))?;
    self
      .send(self.request(reqwest::Method::DELETE, url))
      .await?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn backend_message_passes_through_verbatim() {
    let message = server_error_message(422, r#"{"message": "name already taken"}"#);
    assert_eq!(message, "name already taken");
  }

  #[test]
  fn unparseable_bodies_fall_back_to_a_generic_message() {
    assert_eq!(
      server_error_message(500, "<html>oops</html>"),
      "request failed with status 500"
    );
    assert_eq!(
      server_error_message(404, r#"{"message": ""}"#),
      "request failed with status 404"
    );
  }
}
