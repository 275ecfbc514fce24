use crate::llm::ApiError;
use anyhow::Result;
use reqwest::{Response, StatusCode};
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

const MAX_RETRY_DELAY: Duration = Duration::from_secs(60);

/// Check response status and turn failures into a typed `ApiError`.
pub async fn check_response_error(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let response_text = response
        .text()
        .await
        .map_err(|e| ApiError::NetworkError(e.to_string()))?;

    let error = match status {
        StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimit(response_text),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ApiError::Authentication(response_text)
        }
        StatusCode::BAD_REQUEST => ApiError::InvalidRequest(response_text),
        status if status.is_server_error() => ApiError::ServiceError(response_text),
        _ => ApiError::Unknown(format!("Status {status}: {response_text}")),
    };

    Err(error.into())
}

/// Handle retryable errors for LLM providers.
/// Returns true if the error is transient and the caller should try again,
/// after having waited with exponential backoff.
pub async fn handle_retryable_error(
    error: &anyhow::Error,
    attempts: u32,
    max_retries: u32,
    base_delay: Duration,
) -> bool {
    let Some(api_error) = error.downcast_ref::<ApiError>() else {
        return false;
    };

    if !api_error.is_transient() || attempts >= max_retries {
        if api_error.is_transient() {
            warn!("Giving up after {} attempts: {}", attempts + 1, api_error);
        }
        return false;
    }

    let delay = backoff_delay(base_delay, attempts);
    warn!(
        "Error: {} (attempt {}/{}), retrying in {} ms",
        api_error,
        attempts + 1,
        max_retries,
        delay.as_millis()
    );
    sleep(delay).await;
    true
}

/// Doubles per attempt, capped at one minute.
fn backoff_delay(base_delay: Duration, attempts: u32) -> Duration {
    base_delay
        .saturating_mul(2u32.saturating_pow(attempts))
        .min(MAX_RETRY_DELAY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_then_caps() {
        let base = Duration::from_millis(100);
        assert_eq!(backoff_delay(base, 0), Duration::from_millis(100));
        assert_eq!(backoff_delay(base, 3), Duration::from_millis(800));
        assert_eq!(backoff_delay(base, 31), MAX_RETRY_DELAY);
        assert_eq!(backoff_delay(base, 32), MAX_RETRY_DELAY);
        assert_eq!(backoff_delay(base, u32::MAX), MAX_RETRY_DELAY);
        assert_eq!(backoff_delay(Duration::MAX, 1), MAX_RETRY_DELAY);
    }

    #[tokio::test]
    async fn test_large_attempt_counts_do_not_overflow() {
        let error = anyhow::Error::from(ApiError::ServiceError("busy".to_string()));
        let retry = handle_retryable_error(&error, 40, u32::MAX, Duration::ZERO).await;
        assert!(retry);
    }
}
