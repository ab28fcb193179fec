//! Audio track catalog module
//!
//! This module turns primary probe output into [`AudioTrack`] records, picks
//! the best track of a locator and caches both per [`ProbeSession`].

pub mod probe;
pub mod session;
pub mod track;

// Re-export commonly used types
pub use probe::{RetryPolicy, probe_tracks};
pub use session::ProbeSession;
pub use track::{AudioTrack, codec_weight, select_best_track, tracks_from_probe};
