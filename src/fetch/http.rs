//! Default HTTP transport backed by [`reqwest`].

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use url::Url;

use crate::error::FetchError;

use super::{Fetch, REQUESTED_WITH, REQUESTED_WITH_VALUE};

/// HTTP fetcher resolving sentinel paths against a fixed origin.
///
/// Every request carries the `X-Requested-With: XMLHttpRequest` header, and
/// anything other than `200 OK` is reported as [`FetchError::Status`].
///
/// ## Example
/// ```no_run
/// use scrollvisor::HttpFetcher;
///
/// let fetcher = HttpFetcher::new("https://lists.example.org")?;
/// # Ok::<(), scrollvisor::FetchError>(())
/// ```
#[derive(Debug)]
pub struct HttpFetcher {
    client: Client,
    origin: Url,
}

impl HttpFetcher {
    /// Creates a fetcher with a fresh [`Client`].
    pub fn new(origin: &str) -> Result<Self, FetchError> {
        Self::with_client(origin, Client::new())
    }

    /// Creates a fetcher reusing an existing [`Client`] (connection pools,
    /// proxies, custom TLS).
    pub fn with_client(origin: &str, client: Client) -> Result<Self, FetchError> {
        let origin = Url::parse(origin).map_err(|e| FetchError::BadOrigin {
            message: e.to_string(),
        })?;
        Ok(Self { client, origin })
    }

    /// The origin next-page paths resolve against.
    #[must_use]
    pub fn origin(&self) -> &Url {
        &self.origin
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn get_fragment(&self, path: &str) -> Result<String, FetchError> {
        let url = self.origin.join(path).map_err(|e| FetchError::BadPath {
            path: path.to_string(),
            message: e.to_string(),
        })?;

        let response = self
            .client
            .get(url)
            .header(REQUESTED_WITH, REQUESTED_WITH_VALUE)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;

    use super::*;

    #[tokio::test]
    async fn test_sends_fragment_header() {
        let server = MockServer::start();
        let page = server.mock(|when, then| {
            when.method(GET)
                .path("/items")
                .query_param("page", "2")
                .header(REQUESTED_WITH, REQUESTED_WITH_VALUE);
            then.status(200).body("<tr><td>row</td></tr>");
        });

        let fetcher = HttpFetcher::new(&server.base_url()).unwrap();
        let body = fetcher.get_fragment("/items?page=2").await.unwrap();

        page.assert();
        assert_eq!(body, "<tr><td>row</td></tr>");
    }

    #[tokio::test]
    async fn test_non_200_is_a_status_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/items");
            then.status(204);
        });

        let fetcher = HttpFetcher::new(&server.base_url()).unwrap();
        let err = fetcher.get_fragment("/items").await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 204 }));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport() {
        // Port 1 is never listening on loopback.
        let fetcher = HttpFetcher::new("http://127.0.0.1:1").unwrap();
        let err = fetcher.get_fragment("/items").await.unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }));
    }

    #[test]
    fn test_bad_origin_rejected() {
        let err = HttpFetcher::new("not a url").unwrap_err();
        assert!(matches!(err, FetchError::BadOrigin { .. }));
    }
}
