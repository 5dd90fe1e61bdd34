use serde::{Deserialize, Serialize};

use crate::song::DEFAULT_BPM;

/// Settings for turning a rendered timeline into a MIDI file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Ticks per quarter note
    pub ppq: u16,
    /// MIDI channel every note is written on (0-based)
    pub channel: u8,
    pub velocity: u8,
    /// Name each output track after its instrument
    pub track_names: bool,
    /// Abort on the first step that cannot be rendered
    pub strict: bool,
    /// Seed for random arpeggios; `None` draws from the OS
    pub seed: Option<u64>,
    /// Tempo for single patterns, which carry none of their own
    pub bpm: f32,
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportOptions {
            ppq: 480,
            channel: 0,
            velocity: 127,
            track_names: true,
            strict: false,
            seed: None,
            bpm: DEFAULT_BPM,
        }
    }
}
