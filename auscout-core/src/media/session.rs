//! Media probe session management module
//!
//! Responsibilities:
//! - Cache the track list and best track of one locator
//! - Let the caller decide when cached results are stale (`flush`)
//! - Run AAC profile classification against the cached primary tracks
//!
//! A session owns its cache. Nothing is shared between sessions, so two
//! sessions over the same locator probe independently.

use std::path::Path;
use std::time::Duration;

use crate::aac::{AacProfile, classify_aac_profile};
use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::external::{PrimaryProber, SecondaryProber};
use crate::media::probe::{RetryPolicy, probe_tracks};
use crate::media::track::{AudioTrack, select_best_track};

/// Probe results for one locator, memoized until flushed.
pub struct ProbeSession<P: PrimaryProber> {
    prober: P,
    locator: String,
    input_options: Vec<String>,
    retries: u32,
    timeout: Duration,
    track_list: Option<Vec<AudioTrack>>,
    best_track: Option<AudioTrack>,
}

impl<P: PrimaryProber> ProbeSession<P> {
    /// Creates a session with the default retry and timeout policy.
    pub fn new(prober: P, locator: impl Into<String>) -> Self {
        let defaults = CoreConfig::default();
        Self {
            prober,
            locator: locator.into(),
            input_options: Vec::new(),
            retries: defaults.probe_retries,
            timeout: defaults.probe_timeout,
            track_list: None,
            best_track: None,
        }
    }

    /// Creates a session using the probe policy of `config`.
    pub fn from_config(prober: P, locator: impl Into<String>, config: &CoreConfig) -> Self {
        Self::new(prober, locator)
            .with_retries(config.probe_retries)
            .with_timeout(config.probe_timeout)
    }

    pub fn with_input_options(mut self, input_options: Vec<String>) -> Self {
        self.input_options = input_options;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn locator(&self) -> &str {
        &self.locator
    }

    pub fn input_options(&self) -> &[String] {
        &self.input_options
    }

    /// Audio tracks of the locator. Probes on first use or when `flush` is set.
    ///
    /// Only a non-empty list is cached, so a failed probe is retried by the
    /// next call.
    pub fn track_list(&mut self, flush: bool) -> &[AudioTrack] {
        if flush {
            self.track_list = None;
            self.best_track = None;
        }
        if self.track_list.is_none() {
            let tracks = probe_tracks(
                &self.prober,
                &self.locator,
                &self.input_options,
                self.retries,
                self.timeout,
            );
            if !tracks.is_empty() {
                self.track_list = Some(tracks);
            }
        }
        self.track_list.as_deref().unwrap_or(&[])
    }

    /// Best track of the locator, or `None` when no audio track was found.
    pub fn best_track(&mut self, flush: bool) -> Option<&AudioTrack> {
        if flush || self.best_track.is_none() {
            let best = select_best_track(self.track_list(flush)).cloned();
            self.best_track = best;
        }
        self.best_track.as_ref()
    }

    /// Classifies the AAC profile of the audio track at `track_index`.
    ///
    /// The locator must be a local file. Both probers index audio tracks the
    /// same way, in stream order.
    pub fn aac_profile<S: SecondaryProber + ?Sized>(
        &mut self,
        secondary: &S,
        track_index: usize,
    ) -> CoreResult<AacProfile> {
        if self.locator.contains("://") || !Path::new(&self.locator).is_file() {
            log::warn!("Can only get profile of local file: {}", self.locator);
            return Err(CoreError::LocalFileRequired(self.locator.clone()));
        }

        let tracks = self.track_list(false);
        let track = tracks.get(track_index).cloned().ok_or(CoreError::TrackNotFound {
            index: track_index,
            available: tracks.len(),
        })?;

        if track.codec != "aac" {
            log::info!("Not aac track [{}] ({})", track.index, track.codec);
            return Ok(AacProfile::NonAac);
        }

        let path = Path::new(&self.locator);
        let secondary_tracks = RetryPolicy::new(self.retries).run(|attempt| {
            secondary.audio_tracks(path, self.timeout).inspect_err(|e| {
                log::warn!("Secondary probe attempt {} of {} failed: {}", attempt, self.retries, e);
            })
        })?;
        let fields = secondary_tracks
            .get(track_index)
            .ok_or(CoreError::TrackNotFound {
                index: track_index,
                available: secondary_tracks.len(),
            })?;
        log::debug!("Secondary probe fields for track {}: {:?}", track_index, fields);

        let profile = classify_aac_profile(&track, fields)?;
        log::info!("AAC profile of {} track {}: {}", self.locator, track_index, profile);
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::{ProbeFormat, ProbeOutput, ProbeStream};
    use std::cell::Cell;
    use std::collections::HashMap;

    struct CountingProber {
        calls: Cell<u32>,
        fail: Cell<bool>,
    }

    impl PrimaryProber for CountingProber {
        fn probe(&self, _: &str, _: &[String], _: Duration) -> CoreResult<ProbeOutput> {
            self.calls.set(self.calls.get() + 1);
            if self.fail.get() {
                return Err(CoreError::ProbeOutput("Invalid source".to_string()));
            }
            Ok(ProbeOutput {
                streams: vec![
                    ProbeStream {
                        codec_type: Some("audio".to_string()),
                        codec_name: Some("mp3".to_string()),
                        bit_rate: Some(128000.0),
                        duration: Some(10.0),
                        index: Some(0.0),
                        ..Default::default()
                    },
                    ProbeStream {
                        codec_type: Some("audio".to_string()),
                        codec_name: Some("aac".to_string()),
                        bit_rate: Some(128000.0),
                        duration: Some(10.0),
                        index: Some(1.0),
                        ..Default::default()
                    },
                ],
                format: ProbeFormat::default(),
            })
        }
    }

    fn prober(fail: bool) -> CountingProber {
        CountingProber {
            calls: Cell::new(0),
            fail: Cell::new(fail),
        }
    }

    #[test]
    fn test_track_list_is_memoized() {
        let p = prober(false);
        let mut session = ProbeSession::new(&p, "song.mka");
        assert_eq!(session.track_list(false).len(), 2);
        assert_eq!(session.track_list(false).len(), 2);
        assert_eq!(p.calls.get(), 1);
        session.track_list(true);
        assert_eq!(p.calls.get(), 2);
    }

    #[test]
    fn test_empty_result_not_memoized() {
        let p = prober(true);
        let mut session = ProbeSession::new(&p, "song.mka").with_retries(1);
        assert!(session.track_list(false).is_empty());
        p.fail.set(false);
        assert_eq!(session.track_list(false).len(), 2);
        assert_eq!(p.calls.get(), 2);
    }

    #[test]
    fn test_best_track_prefers_aac() {
        let p = prober(false);
        let mut session = ProbeSession::new(&p, "song.mka");
        assert_eq!(session.best_track(false).map(|t| t.index), Some(1));
        assert_eq!(session.best_track(false).map(|t| t.index), Some(1));
        assert_eq!(p.calls.get(), 1);
    }

    struct FlakySecondary {
        failures_left: Cell<u32>,
        calls: Cell<u32>,
    }

    impl SecondaryProber for FlakySecondary {
        fn audio_tracks(
            &self,
            path: &Path,
            timeout: Duration,
        ) -> CoreResult<Vec<crate::external::SecondaryTrack>> {
            self.calls.set(self.calls.get() + 1);
            if self.failures_left.get() > 0 {
                self.failures_left.set(self.failures_left.get() - 1);
                return Err(CoreError::CommandTimeout(path.display().to_string(), timeout));
            }
            let fields = [("Format_profile", "LC")]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            Ok(vec![HashMap::new(), fields])
        }
    }

    fn local_file() -> tempfile::NamedTempFile {
        tempfile::NamedTempFile::new().unwrap()
    }

    #[test]
    fn test_aac_profile_retries_secondary_probe() {
        let file = local_file();
        let p = prober(false);
        let secondary = FlakySecondary { failures_left: Cell::new(2), calls: Cell::new(0) };
        let mut session = ProbeSession::new(&p, file.path().to_string_lossy()).with_retries(3);
        assert_eq!(session.aac_profile(&secondary, 1).unwrap(), AacProfile::Lc);
        assert_eq!(secondary.calls.get(), 3);
    }

    #[test]
    fn test_aac_profile_secondary_retries_exhausted() {
        let file = local_file();
        let p = prober(false);
        let secondary = FlakySecondary { failures_left: Cell::new(5), calls: Cell::new(0) };
        let mut session = ProbeSession::new(&p, file.path().to_string_lossy()).with_retries(2);
        let err = session.aac_profile(&secondary, 1).unwrap_err();
        assert!(matches!(err, CoreError::CommandTimeout(..)));
        assert_eq!(secondary.calls.get(), 2);
    }

    #[test]
    fn test_aac_profile_rejects_remote() {
        struct NoSecondary;
        impl SecondaryProber for NoSecondary {
            fn audio_tracks(
                &self,
                _: &Path,
                _: Duration,
            ) -> CoreResult<Vec<crate::external::SecondaryTrack>> {
                panic!("must not be called");
            }
        }
        let p = prober(false);
        let mut session = ProbeSession::new(&p, "http://example.com/a.aac");
        let err = session.aac_profile(&NoSecondary, 0).unwrap_err();
        assert!(matches!(err, CoreError::LocalFileRequired(_)));
        assert_eq!(p.calls.get(), 0);
    }
}
