//! Retry policy for gateway calls
//!
//! Exponential backoff with a hard cap, plus the classification of which
//! failures are worth retrying at all. Callers bound the number of attempts;
//! this module only paces them.

/// Delay before the first retry, in milliseconds
pub const MIN_BACKOFF_MS: u64 = 500;
/// Ceiling for the backoff delay, in milliseconds
pub const MAX_BACKOFF_MS: u64 = 8_000;

/// Per-call backoff tracker
#[derive(Debug)]
pub struct Backoff {
    attempts: u32,
    current_ms: u64,
}

impl Backoff {
    pub fn new() -> Self {
        Self {
            attempts: 0,
            current_ms: MIN_BACKOFF_MS,
        }
    }

    /// Record a failed attempt and return the delay before the next one
    pub fn next_delay_ms(&mut self) -> u64 {
        self.attempts += 1;
        if self.attempts > 1 {
            self.current_ms = (self.current_ms * 2).min(MAX_BACKOFF_MS);
        }
        self.current_ms
    }

    /// Number of failed attempts recorded so far
    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new()
    }
}

/// Check if an HTTP status code indicates a transient provider failure
pub fn is_retryable_status(status: u16) -> bool {
    matches!(
        status,
        408 | // Request Timeout
        429 | // Too Many Requests
        500 | // Internal Server Error (sometimes transient)
        502 | // Bad Gateway
        503 | // Service Unavailable
        504 // Gateway Timeout
    )
}

/// Check if a transport error is worth retrying
pub fn is_retryable_transport(err: &reqwest::Error) -> bool {
    err.is_timeout()
        || err.is_connect()
        || err
            .status()
            .map(|s| is_retryable_status(s.as_u16()))
            .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponential_backoff() {
        let mut backoff = Backoff::new();

        assert_eq!(backoff.next_delay_ms(), 500);
        assert_eq!(backoff.next_delay_ms(), 1_000);
        assert_eq!(backoff.next_delay_ms(), 2_000);
        assert_eq!(backoff.next_delay_ms(), 4_000);
        assert_eq!(backoff.next_delay_ms(), 8_000);

        // capped
        assert_eq!(backoff.next_delay_ms(), 8_000);
        assert_eq!(backoff.attempts(), 6);
    }

    #[test]
    fn test_is_retryable_status() {
        assert!(is_retryable_status(408));
        assert!(is_retryable_status(429));
        assert!(is_retryable_status(502));
        assert!(is_retryable_status(503));
        assert!(is_retryable_status(504));
        assert!(!is_retryable_status(400));
        assert!(!is_retryable_status(401));
        assert!(!is_retryable_status(404));
        assert!(!is_retryable_status(200));
    }
}
