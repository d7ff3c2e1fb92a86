//! Blocking POM downloads with bounded retries.
//!
//! Only called from the loading stage, which already runs on a blocking
//! thread, so the blocking reqwest client is used directly.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::StatusCode;

use droidplan_util::errors::{DroidplanError, ResolveResult};

use crate::repository::MavenRepository;

const MAX_RETRIES: u32 = 3;
const RETRY_DELAY: Duration = Duration::from_millis(500);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the HTTP client shared by every download of a run.
pub fn build_client() -> ResolveResult<Client> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(concat!("droidplan/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| DroidplanError::Network {
            message: format!("Failed to create HTTP client: {e}"),
        })
}

/// Basic auth when a username is configured; a lone password is sent as a
/// bearer token.
fn apply_auth(request: RequestBuilder, repo: &MavenRepository) -> RequestBuilder {
    if !repo.has_auth() {
        return request;
    }
    match (&repo.username, &repo.password) {
        (Some(user), pass) => request.basic_auth(user, pass.as_ref()),
        (None, Some(token)) => request.bearer_auth(token),
        (None, None) => request,
    }
}

/// Download a text file.
///
/// Returns `Ok(None)` on 404. Server errors, timeouts and connection
/// failures are retried up to [`MAX_RETRIES`] times; any other failure is
/// returned immediately.
pub fn download_text(
    client: &Client,
    repo: &MavenRepository,
    url: &str,
) -> ResolveResult<Option<String>> {
    let mut last_err = String::new();

    for attempt in 0..MAX_RETRIES {
        if attempt > 0 {
            std::thread::sleep(RETRY_DELAY * attempt);
            tracing::debug!("retrying {url} (attempt {})", attempt + 1);
        }

        match apply_auth(client.get(url), repo).send() {
            Ok(resp) => {
                let status = resp.status();
                if status == StatusCode::NOT_FOUND {
                    return Ok(None);
                }
                if status.is_server_error() {
                    last_err = format!("HTTP {status} from {url}");
                    continue;
                }
                if !status.is_success() {
                    return Err(DroidplanError::Network {
                        message: format!("HTTP {status} fetching {url}"),
                    });
                }
                let body = resp.text().map_err(|e| DroidplanError::Network {
                    message: format!("Failed to read response from {url}: {e}"),
                })?;
                return Ok(Some(body));
            }
            Err(e) if e.is_timeout() || e.is_connect() => {
                last_err = e.to_string();
                continue;
            }
            Err(e) => {
                return Err(DroidplanError::Network {
                    message: format!("Request to {url} failed: {e}"),
                });
            }
        }
    }

    Err(DroidplanError::Network {
        message: format!("Failed after {MAX_RETRIES} retries for {url}: {last_err}"),
    })
}
