//! HTTP client wrapper for the identifier minting service.

use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;

use crate::error::{MetsError, Result};

/// User agent string identifying this client.
const USER_AGENT: &str = concat!("sip-mets/", env!("CARGO_PKG_VERSION"));

/// Maximum number of attempts for requests that never reached the server.
const MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff (milliseconds).
const RETRY_BASE_DELAY_MS: u64 = 500;

/// Create a configured HTTP client.
///
/// # Arguments
/// * `timeout_secs` - Request timeout
pub fn create_client(timeout_secs: u64) -> Result<Client> {
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

/// POST to a URL and return the response body as text.
///
/// Only connection failures are retried, with exponential backoff. A request
/// that reached the server is never repeated: minting is not idempotent, and
/// a timed-out or failed request may still have consumed identifiers.
///
/// # Arguments
/// * `client` - HTTP client to use
/// * `url` - URL to post to
pub fn post_text(client: &Client, url: &str) -> Result<String> {
    let mut last_error: Option<String> = None;

    for attempt in 0..MAX_RETRIES {
        if attempt > 0 {
            // Exponential backoff: 500ms, 1000ms
            let delay = RETRY_BASE_DELAY_MS * (1 << (attempt - 1));
            tracing::debug!(attempt, delay_ms = delay, "Retrying after delay");
            thread::sleep(Duration::from_millis(delay));
        }

        match client.post(url).send() {
            Ok(response) => {
                let response = response.error_for_status()?;
                return Ok(response.text()?);
            }
            Err(e) if e.is_connect() => {
                tracing::warn!(
                    error = %e,
                    attempt = attempt + 1,
                    max_retries = MAX_RETRIES,
                    "Connection error, will retry"
                );
                last_error = Some(e.to_string());
            }
            Err(e) => return Err(MetsError::Http(e)),
        }
    }

    Err(MetsError::RetriesExhausted {
        attempts: MAX_RETRIES,
        message: last_error.unwrap_or_else(|| "Unknown error".to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_client() {
        let client = create_client(5);
        assert!(client.is_ok());
    }

    #[test]
    fn test_unreachable_host_exhausts_retries() {
        let client = create_client(1).unwrap();
        // Port 9 (discard) on localhost is closed in test environments.
        let err = post_text(&client, "http://127.0.0.1:9/pii/81055?arks=1").unwrap_err();
        assert!(matches!(
            err,
            MetsError::RetriesExhausted { attempts: 3, .. } | MetsError::Http(_)
        ));
    }
}
