//! Track probing with bounded retries.
//!
//! A probe that fails (non-zero exit, timeout, empty or malformed output) is
//! retried immediately. Once the attempts run out the caller gets an empty
//! track list, which means "no tracks found" rather than an error.

use std::time::Duration;

use crate::error::{CoreError, CoreResult};
use crate::external::PrimaryProber;
use crate::media::track::{AudioTrack, tracks_from_probe};

/// Fixed number of attempts with no backoff between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    attempts: u32,
}

impl RetryPolicy {
    /// `attempts` counts every try, including the first.
    pub fn new(attempts: u32) -> Self {
        Self { attempts }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Runs `op` until it succeeds or the attempts are used up, returning the
    /// last error in the latter case.
    pub fn run<T, F>(&self, mut op: F) -> CoreResult<T>
    where
        F: FnMut(u32) -> CoreResult<T>,
    {
        let mut last_err = None;
        for attempt in 1..=self.attempts {
            match op(attempt) {
                Ok(value) => return Ok(value),
                Err(e) => {
                    if attempt < self.attempts {
                        log::debug!("Attempt {}/{} failed: {}", attempt, self.attempts, e);
                    }
                    last_err = Some(e);
                }
            }
        }
        Err(last_err
            .unwrap_or_else(|| CoreError::Config("retry policy allows no attempts".to_string())))
    }
}

/// Probes `locator` and returns its audio tracks, or an empty list once
/// `retries` attempts have all failed.
pub fn probe_tracks<P: PrimaryProber + ?Sized>(
    prober: &P,
    locator: &str,
    input_options: &[String],
    retries: u32,
    timeout: Duration,
) -> Vec<AudioTrack> {
    if retries == 0 {
        log::warn!("Probe of {} skipped: zero attempts allowed", locator);
        return Vec::new();
    }

    let policy = RetryPolicy::new(retries);
    match policy.run(|_| prober.probe(locator, input_options, timeout)) {
        Ok(output) => {
            let tracks = tracks_from_probe(&output);
            log::debug!("Found {} audio track(s) in {}", tracks.len(), locator);
            tracks
        }
        Err(e) => {
            match &e {
                CoreError::CommandTimeout(cmd, _) => log::warn!("Timeout Expired: {}", cmd),
                CoreError::CommandFailed(..) => log::warn!("Probe failed for {}: {}", locator, e),
                _ => log::error!("Probe error for {}: {}", locator, e),
            }
            Vec::new()
        }
    }
}
