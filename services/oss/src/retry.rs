// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.
//! Retry policies for failed requests.

use crate::error::ServiceError;
use crate::Config;
use alioss_core::{Error, ErrorKind};
use rand::Rng;
use std::fmt::Debug;
use std::time::Duration;

const RETRYABLE_STATUS: [u16; 5] = [429, 500, 502, 503, 504];

const RETRYABLE_CODES: [&str; 7] = [
    "Throttling",
    "ThrottlingException",
    "RequestThrottled",
    "RequestLimitExceeded",
    "TooManyRequests",
    "SlowDown",
    "RequestTimeout",
];

/// Retryer decides whether and when a failed attempt is tried again.
pub trait Retryer: Debug + Send + Sync + 'static {
    /// Total attempts including the first one.
    fn max_attempts(&self) -> usize;

    /// Check if the error is worth another attempt.
    fn is_retryable(&self, err: &Error) -> bool;

    /// Delay before the given attempt, starting at 1 for the first retry.
    fn retry_delay(&self, attempt: usize, err: &Error) -> Duration;
}

/// StandardRetryer retries transport failures, throttling and server errors
/// with exponential backoff and full jitter.
#[derive(Debug, Clone)]
pub struct StandardRetryer {
    max_attempts: usize,
    base_delay: Duration,
    max_backoff: Duration,
}

impl Default for StandardRetryer {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(200),
            max_backoff: Duration::from_secs(20),
        }
    }
}

impl StandardRetryer {
    /// Create a retryer with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a retryer from the retry settings in config.
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_attempts: config.retry_max_attempts.max(1),
            base_delay: config.retry_base_delay,
            max_backoff: config.retry_max_backoff,
        }
    }

    /// Set the max attempts, at least 1.
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Set the base delay.
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Set the upper bound of a single delay.
    pub fn with_max_backoff(mut self, delay: Duration) -> Self {
        self.max_backoff = delay;
        self
    }

    fn backoff_ceiling(&self, attempt: usize) -> Duration {
        let exp = attempt.saturating_sub(1).min(31) as u32;
        self.base_delay
            .checked_mul(1u32 << exp)
            .unwrap_or(self.max_backoff)
            .min(self.max_backoff)
    }
}

impl Retryer for StandardRetryer {
    fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    fn is_retryable(&self, err: &Error) -> bool {
        match err.kind() {
            ErrorKind::Transport => true,
            ErrorKind::ServiceError => match ServiceError::downcast(err) {
                Some(se) => {
                    RETRYABLE_STATUS.contains(&se.status_code)
                        || RETRYABLE_CODES.contains(&se.code.as_str())
                }
                None => false,
            },
            _ => false,
        }
    }

    fn retry_delay(&self, attempt: usize, _: &Error) -> Duration {
        let ceiling = self.backoff_ceiling(attempt);
        if ceiling.is_zero() {
            return ceiling;
        }
        let millis = rand::thread_rng().gen_range(0..=ceiling.as_millis() as u64);
        Duration::from_millis(millis)
    }
}

/// NopRetryer never retries.
#[derive(Debug, Clone, Copy, Default)]
pub struct NopRetryer;

impl Retryer for NopRetryer {
    fn max_attempts(&self) -> usize {
        1
    }

    fn is_retryable(&self, _: &Error) -> bool {
        false
    }

    fn retry_delay(&self, _: usize, _: &Error) -> Duration {
        Duration::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn service_error(status_code: u16, code: &str) -> Error {
        ServiceError {
            status_code,
            code: code.to_string(),
            ..Default::default()
        }
        .into()
    }

    #[test_case(service_error(503, "ServiceUnavailable"), true; "service unavailable")]
    #[test_case(service_error(500, "InternalError"), true; "internal error")]
    #[test_case(service_error(429, "TooManyRequests"), true; "too many requests")]
    #[test_case(service_error(400, "RequestTimeout"), true; "throttling code")]
    #[test_case(service_error(404, "NoSuchKey"), false; "not found")]
    #[test_case(service_error(403, "AccessDenied"), false; "access denied")]
    #[test_case(Error::transport("connection reset"), true; "transport")]
    #[test_case(Error::request_invalid("bad bucket"), false; "invalid request")]
    #[test_case(Error::checksum_mismatch("crc"), false; "checksum")]
    fn test_is_retryable(err: Error, expected: bool) {
        assert_eq!(StandardRetryer::new().is_retryable(&err), expected);
        assert!(!NopRetryer.is_retryable(&err));
    }

    #[test]
    fn test_backoff_bounds() {
        let retryer = StandardRetryer::new()
            .with_base_delay(Duration::from_millis(100))
            .with_max_backoff(Duration::from_millis(1000));
        let err = Error::transport("reset");

        assert_eq!(retryer.backoff_ceiling(1), Duration::from_millis(100));
        assert_eq!(retryer.backoff_ceiling(3), Duration::from_millis(400));
        assert_eq!(retryer.backoff_ceiling(10), Duration::from_millis(1000));
        assert_eq!(retryer.backoff_ceiling(100), Duration::from_millis(1000));
        for attempt in 1..20 {
            let delay = retryer.retry_delay(attempt, &err);
            assert!(delay <= retryer.backoff_ceiling(attempt));
        }
    }

    #[test]
    fn test_from_config() {
        let config = Config {
            retry_max_attempts: 0,
            ..Default::default()
        };
        assert_eq!(StandardRetryer::from_config(&config).max_attempts(), 1);
        assert_eq!(StandardRetryer::new().max_attempts(), 3);
        assert_eq!(NopRetryer.max_attempts(), 1);
    }
}
