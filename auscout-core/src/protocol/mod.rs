// ============================================================================
// auscout-core/src/protocol/mod.rs
// ============================================================================
//
// PROTOCOL RACING: Pick the Fastest Working Transport for a Stream
//
// A stream URL can usually be reached over more than one transport (an mms
// station also answers on rtsp and mmsh, an http stream may answer on mmsh).
// Each candidate is probed `repeat` times; every attempt is timed, and a
// failed attempt is scored with a fixed penalty. The candidate with the
// lowest mean time among those with at least one success wins.
//
// Local files (no "://") skip racing and report the pseudo-scheme "file".

pub mod url;

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::config::{CoreConfig, FAILED_ATTEMPT_PENALTY_SECS};
use crate::error::{CoreError, CoreResult};
use crate::external::PrimaryProber;
use crate::media::{AudioTrack, ProbeSession};

pub use url::{candidate_request, candidate_schemes, canonical_scheme, normalize_url};

/// Scheme reported for local files.
pub const LOCAL_SCHEME: &str = "file";

/// Source of monotonic time for attempt timing.
pub trait Clock {
    /// Time elapsed since an arbitrary fixed origin.
    fn now(&self) -> Duration;
}

/// Wall clock backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Duration {
        (**self).now()
    }
}

/// Timing record of one candidate transport.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolCandidate {
    pub scheme: String,
    /// Seconds per attempt; failed attempts hold the penalty.
    pub attempt_times: Vec<f64>,
    pub successes: u32,
    /// Best track seen by the most recent successful attempt.
    pub last_track: Option<AudioTrack>,
}

impl ProtocolCandidate {
    fn new(scheme: &str) -> Self {
        Self {
            scheme: scheme.to_string(),
            attempt_times: Vec::new(),
            successes: 0,
            last_track: None,
        }
    }

    /// Mean attempt time, penalties included.
    pub fn average(&self) -> f64 {
        if self.attempt_times.is_empty() {
            return FAILED_ATTEMPT_PENALTY_SECS;
        }
        self.attempt_times.iter().sum::<f64>() / self.attempt_times.len() as f64
    }
}

/// Outcome of a race.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProtocolSelection {
    pub selected_scheme: String,
    /// Seconds
    pub average_connect_time: f64,
    pub winning_track: AudioTrack,
    /// Locator the winning candidate probed
    pub locator: String,
    /// Input options the winning candidate probed with
    pub input_options: Vec<String>,
}

/// Races candidate transports of a stream URL.
pub struct ProtocolRacer<P: PrimaryProber, C: Clock = SystemClock> {
    prober: P,
    clock: C,
    repeat: u32,
    attempt_timeout: Duration,
    local_retries: u32,
    local_timeout: Duration,
}

impl<P: PrimaryProber> ProtocolRacer<P, SystemClock> {
    pub fn new(prober: P) -> Self {
        Self::from_config(prober, &CoreConfig::default())
    }

    pub fn from_config(prober: P, config: &CoreConfig) -> Self {
        Self {
            prober,
            clock: SystemClock::new(),
            repeat: config.race_repeat,
            attempt_timeout: config.race_timeout,
            local_retries: config.probe_retries,
            local_timeout: config.probe_timeout,
        }
    }
}

impl<P: PrimaryProber, C: Clock> ProtocolRacer<P, C> {
    /// Replaces the clock used to time attempts.
    pub fn with_clock<C2: Clock>(self, clock: C2) -> ProtocolRacer<P, C2> {
        ProtocolRacer {
            prober: self.prober,
            clock,
            repeat: self.repeat,
            attempt_timeout: self.attempt_timeout,
            local_retries: self.local_retries,
            local_timeout: self.local_timeout,
        }
    }

    pub fn with_repeat(mut self, repeat: u32) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    /// Selects the transport for `url`.
    ///
    /// # Errors
    ///
    /// * `UnsupportedProtocolScheme` - the scheme has no candidate transports
    /// * `NoAvailableProtocol` - no candidate succeeded even once, or a local
    ///   file has no audio track
    pub fn select(&self, url: &str, input_options: &[String]) -> CoreResult<ProtocolSelection> {
        if !url.contains("://") {
            return self.select_local(url, input_options);
        }

        let normalized = normalize_url(url);
        let Some((scheme, rest)) = normalized.split_once("://") else {
            return Err(CoreError::UnsupportedProtocolScheme(normalized.clone()));
        };
        let scheme = canonical_scheme(scheme);
        let schemes = candidate_schemes(&scheme)?;

        let mut winner: Option<(ProtocolCandidate, String, Vec<String>)> = None;
        for candidate_scheme in schemes {
            let (locator, options) = candidate_request(candidate_scheme, rest, input_options);
            let candidate = self.race_candidate(candidate_scheme, &locator, &options);
            log::info!("{}, {:?}", locator, candidate.attempt_times);

            if candidate.successes == 0 {
                continue;
            }
            let better = match &winner {
                Some((best, _, _)) => candidate.average() < best.average(),
                None => true,
            };
            if better {
                winner = Some((candidate, locator, options));
            }
        }

        let Some((candidate, locator, options)) = winner else {
            return Err(CoreError::NoAvailableProtocol(url.to_string()));
        };
        let average_connect_time = candidate.average();
        let winning_track = candidate
            .last_track
            .ok_or_else(|| CoreError::NoAvailableProtocol(url.to_string()))?;

        log::info!(
            "Selected {} for {} (average {:.3}s)",
            candidate.scheme,
            url,
            average_connect_time
        );
        Ok(ProtocolSelection {
            selected_scheme: candidate.scheme,
            average_connect_time,
            winning_track,
            locator,
            input_options: options,
        })
    }

    fn race_candidate(&self, scheme: &str, locator: &str, options: &[String]) -> ProtocolCandidate {
        let mut candidate = ProtocolCandidate::new(scheme);
        for _ in 0..self.repeat {
            let start = self.clock.now();
            let mut session = ProbeSession::new(&self.prober, locator)
                .with_input_options(options.to_vec())
                .with_retries(1)
                .with_timeout(self.attempt_timeout);
            match session.best_track(true).cloned() {
                Some(track) => {
                    let elapsed = self.clock.now().saturating_sub(start);
                    candidate.attempt_times.push(elapsed.as_secs_f64());
                    candidate.successes += 1;
                    candidate.last_track = Some(track);
                }
                None => candidate.attempt_times.push(FAILED_ATTEMPT_PENALTY_SECS),
            }
        }
        candidate
    }

    fn select_local(&self, path: &str, input_options: &[String]) -> CoreResult<ProtocolSelection> {
        let mut session = ProbeSession::new(&self.prober, path)
            .with_input_options(input_options.to_vec())
            .with_retries(self.local_retries)
            .with_timeout(self.local_timeout);
        let track = session
            .best_track(false)
            .cloned()
            .ok_or_else(|| CoreError::NoAvailableProtocol(path.to_string()))?;
        Ok(ProtocolSelection {
            selected_scheme: LOCAL_SCHEME.to_string(),
            average_connect_time: 0.0,
            winning_track: track,
            locator: path.to_string(),
            input_options: input_options.to_vec(),
        })
    }
}

/// Races `url` with the system clock and the given attempt policy.
pub fn select_protocol<P: PrimaryProber>(
    prober: P,
    url: &str,
    input_options: &[String],
    repeat: u32,
    attempt_timeout: Duration,
) -> CoreResult<ProtocolSelection> {
    ProtocolRacer::new(prober)
        .with_repeat(repeat)
        .with_attempt_timeout(attempt_timeout)
        .select(url, input_options)
}
