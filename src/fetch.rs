//! Outbound HTTP for the extractor.
//!
//! One [`Fetcher`] owns one `reqwest::Client`, so connection pooling, the
//! timeout and the user agent are shared by every request of an extraction.

use crate::config::ExtractorConfig;
use crate::error::ExtractError;
use reqwest::Client;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, instrument};
use url::Url;

#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    redirect_delay: Duration,
}

impl Fetcher {
    pub fn new(config: &ExtractorConfig) -> Result<Self, ExtractError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            client,
            redirect_delay: config.redirect_delay(),
        })
    }

    /// GET a document. Returns the URL the response finally came from and
    /// the decoded body; any non-2xx status is an error.
    #[instrument(level = "debug", skip_all, fields(%url))]
    pub async fn get_text(&self, url: &Url) -> Result<(Url, String), ExtractError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ExtractError::Status {
                url: url.to_string(),
                status,
            });
        }
        let final_url = response.url().clone();
        let body = response.text().await?;
        debug!(%final_url, bytes = body.len(), "Fetched document");
        Ok((final_url, body))
    }

    /// Follow a redirector link to its destination.
    ///
    /// Redirector pages are generated lazily on the server side, so the
    /// request is only sent after the configured delay.
    #[instrument(level = "info", skip_all, fields(%url))]
    pub async fn resolve_redirects(&self, url: &Url) -> Result<Url, ExtractError> {
        sleep(self.redirect_delay).await;
        let response = self.client.get(url.clone()).send().await?;
        let resolved = response.url().clone();
        debug!(%resolved, status = %response.status(), "Resolved redirector link");
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn fetcher() -> Fetcher {
        let config = ExtractorConfig {
            redirect_delay_ms: 0,
            ..ExtractorConfig::default()
        };
        Fetcher::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_get_text_ok() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/page");
            then.status(200).body("<p>oi</p>");
        });
        let url = Url::parse(&server.url("/page")).unwrap();
        let (final_url, body) = fetcher().get_text(&url).await.unwrap();
        mock.assert();
        assert_eq!(final_url, url);
        assert_eq!(body, "<p>oi</p>");
    }

    #[tokio::test]
    async fn test_get_text_non_success_is_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/missing");
            then.status(404);
        });
        let url = Url::parse(&server.url("/missing")).unwrap();
        let err = fetcher().get_text(&url).await.unwrap_err();
        assert_eq!(err.kind(), "status");
    }

    #[tokio::test]
    async fn test_resolve_redirects_follows_chain() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/rd");
            then.status(302).header("location", "/hop");
        });
        server.mock(|when, then| {
            when.method(GET).path("/hop");
            then.status(301).header("location", "/final");
        });
        server.mock(|when, then| {
            when.method(GET).path("/final");
            then.status(200).body("ok");
        });
        let url = Url::parse(&server.url("/rd")).unwrap();
        let resolved = fetcher().resolve_redirects(&url).await.unwrap();
        assert_eq!(resolved.path(), "/final");
    }
}
