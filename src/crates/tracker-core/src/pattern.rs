use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

use crate::error::{Error, Result};
use crate::fraction::Fraction;
use crate::track::Track;

/// Length of one grid step in quarter notes: a step is a sixteenth note
pub const STEP_BEATS: Fraction = Fraction {
    numerator: 1,
    denominator: 4,
};

/// Eight tracks played together
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pattern {
    tracks: Vec<Track>,
}

impl Pattern {
    pub const NUMBER_OF_TRACKS: usize = 8;

    /// Byte range of the track data inside a `.mtp` pattern file
    pub const OFFSET_START: usize = 0x1C;
    pub const OFFSET_END: usize = 0x1824;

    pub const PAYLOAD_LENGTH: usize = Self::NUMBER_OF_TRACKS * Track::PAYLOAD_LENGTH;

    pub fn new(tracks: Vec<Track>) -> Result<Pattern> {
        if tracks.len() != Self::NUMBER_OF_TRACKS {
            return Err(Error::InvalidCount {
                entity: "pattern tracks",
                expected: Self::NUMBER_OF_TRACKS,
                actual: tracks.len(),
            });
        }
        Ok(Pattern { tracks })
    }

    /// Decode the track payload, without the file header
    pub fn from_bytes(data: &[u8]) -> Result<Pattern> {
        if data.len() != Self::PAYLOAD_LENGTH {
            return Err(Error::malformed_length("pattern", Self::PAYLOAD_LENGTH, data.len()));
        }

        let tracks = data
            .chunks_exact(Track::PAYLOAD_LENGTH)
            .map(Track::from_bytes)
            .collect::<Result<Vec<_>>>()?;

        Pattern::new(tracks)
    }

    /// Decode a whole pattern file as read from disk
    pub fn from_file_bytes(data: &[u8]) -> Result<Pattern> {
        let payload = data
            .get(Self::OFFSET_START..Self::OFFSET_END)
            .ok_or(Error::malformed_length("pattern file", Self::OFFSET_END, data.len()))?;
        Pattern::from_bytes(payload)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.tracks.iter().flat_map(Track::to_bytes).collect()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Played length in steps. Every track of a pattern shares the first
    /// track's length in current firmware.
    pub fn length(&self) -> usize {
        self.tracks[0].length()
    }

    /// Played length in quarter notes
    pub fn duration(&self) -> Fraction {
        Fraction::from(self.length()) * STEP_BEATS
    }

    pub fn instruments(&self) -> BTreeSet<u8> {
        self.tracks.iter().flat_map(Track::instruments).collect()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, track) in self.tracks.iter().enumerate() {
            let steps: Vec<String> = track.live_steps().iter().map(|s| s.to_string()).collect();
            writeln!(f, "Track {}: {}", i + 1, steps.join(" | "))?;
        }
        Ok(())
    }
}
