//! Shared HTTP plumbing for the REST price sources

use super::FetchError;
use reqwest::Client;
use std::time::Duration;

/// Some providers reject requests without a browser-like agent
const USER_AGENT: &str = "Mozilla/5.0 (compatible; momentum-scanner/0.1)";

/// Build a client with the per-request timeout applied
pub(crate) fn build_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
}

/// GET a URL and return the body, mapping non-2xx statuses to [`FetchError::Status`]
pub(crate) async fn get_body(
    client: &Client,
    url: &str,
    query: &[(&str, &str)],
    provider: &'static str,
    symbol: &str,
) -> Result<String, FetchError> {
    tracing::trace!(url, provider, symbol, "Fetching quote");

    let response = client.get(url).query(query).send().await?;

    if !response.status().is_success() {
        return Err(FetchError::Status {
            provider,
            symbol: symbol.to_string(),
            status: response.status().as_u16(),
        });
    }

    Ok(response.text().await?)
}

/// Build a [`FetchError::Parse`] for a provider response
pub(crate) fn parse_error(
    provider: &'static str,
    symbol: &str,
    reason: impl ToString,
) -> FetchError {
    FetchError::Parse {
        provider,
        symbol: symbol.to_string(),
        reason: reason.to_string(),
    }
}
