// auscout-core/tests/common/mod.rs

// Shared fakes for the integration tests. Each fake implements one of the
// public collaborator traits and records what it was asked to do.

#![allow(dead_code)]

use auscout_core::error::{CoreError, CoreResult};
use auscout_core::external::{
    PrimaryProber, ProbeFormat, ProbeOutput, ProbeStream, SecondaryProber, SecondaryTrack,
};
use auscout_core::protocol::Clock;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

/// Clock that only moves when a fake prober says so.
#[derive(Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// Audio stream entry with the fields ffprobe usually reports.
pub fn audio_stream(codec: &str, bit_rate: f64, duration: f64, index: u32) -> ProbeStream {
    ProbeStream {
        codec_type: Some("audio".to_string()),
        codec_name: Some(codec.to_string()),
        bit_rate: Some(bit_rate),
        sample_rate: Some(44100.0),
        channels: Some(2.0),
        duration: Some(duration),
        index: Some(f64::from(index)),
    }
}

pub fn probe_output(streams: Vec<ProbeStream>) -> ProbeOutput {
    ProbeOutput {
        streams,
        format: ProbeFormat {
            format_name: Some("asf".to_string()),
            duration: Some(300.0),
        },
    }
}

/// Outcome of probing a locator with a given scheme prefix.
#[derive(Clone)]
pub struct ScriptedResponse {
    pub output: Option<ProbeOutput>,
    pub cost: Duration,
}

/// Primary prober answering by locator prefix, advancing a shared clock.
pub struct ScriptedProber {
    clock: ManualClock,
    responses: RefCell<Vec<(String, ScriptedResponse)>>,
    pub calls: RefCell<Vec<(String, Vec<String>)>>,
}

impl ScriptedProber {
    pub fn new(clock: ManualClock) -> Self {
        Self {
            clock,
            responses: RefCell::new(Vec::new()),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn succeed(&self, prefix: &str, output: ProbeOutput, cost: Duration) {
        self.responses.borrow_mut().push((
            prefix.to_string(),
            ScriptedResponse {
                output: Some(output),
                cost,
            },
        ));
    }

    pub fn fail(&self, prefix: &str, cost: Duration) {
        self.responses.borrow_mut().push((
            prefix.to_string(),
            ScriptedResponse { output: None, cost },
        ));
    }

    pub fn calls_with_prefix(&self, prefix: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|(locator, _)| locator.starts_with(prefix))
            .count()
    }
}

impl PrimaryProber for ScriptedProber {
    fn probe(
        &self,
        locator: &str,
        input_options: &[String],
        timeout: Duration,
    ) -> CoreResult<ProbeOutput> {
        self.calls
            .borrow_mut()
            .push((locator.to_string(), input_options.to_vec()));
        let response = self
            .responses
            .borrow()
            .iter()
            .find(|(prefix, _)| locator.starts_with(prefix.as_str()))
            .map(|(_, r)| r.clone());
        match response {
            Some(ScriptedResponse {
                output: Some(output),
                cost,
            }) => {
                self.clock.advance(cost);
                Ok(output)
            }
            Some(ScriptedResponse { output: None, cost }) => {
                self.clock.advance(cost.min(timeout));
                Err(CoreError::CommandTimeout(locator.to_string(), timeout))
            }
            None => Err(CoreError::ProbeOutput(format!("Invalid source {locator}"))),
        }
    }
}

/// Secondary prober returning canned field maps.
#[derive(Default)]
pub struct FakeSecondary {
    tracks: Vec<SecondaryTrack>,
    pub calls: RefCell<Vec<PathBuf>>,
}

impl FakeSecondary {
    pub fn with_tracks(tracks: Vec<Vec<(&str, &str)>>) -> Self {
        Self {
            tracks: tracks
                .into_iter()
                .map(|pairs| {
                    pairs
                        .into_iter()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect::<HashMap<_, _>>()
                })
                .collect(),
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl SecondaryProber for FakeSecondary {
    fn audio_tracks(&self, path: &Path, _timeout: Duration) -> CoreResult<Vec<SecondaryTrack>> {
        self.calls.borrow_mut().push(path.to_path_buf());
        Ok(self.tracks.clone())
    }
}

/// Writes a 16-bit stereo WAV file from (left, right) frames.
pub fn write_stereo_wav(path: &Path, frames: impl IntoIterator<Item = (i16, i16)>) {
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: 44100,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).expect("create wav");
    for (l, r) in frames {
        writer.write_sample(l).expect("write left");
        writer.write_sample(r).expect("write right");
    }
    writer.finalize().expect("finalize wav");
}
