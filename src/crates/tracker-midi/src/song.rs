//! Instrument to output track assignment and song sequencing.
//!
//! Tracker tracks are voices, not instruments: any track may play any
//! instrument. MIDI tracks are the other way around, so output gets one
//! track per instrument used, in ascending instrument order.

use rand::Rng;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};
use tracker_core::{Fraction, Pattern, Song};

use crate::synth::{Rendered, StepError, Synthesizer};

/// Tempo used when a pattern is exported on its own
pub const DEFAULT_BPM: f32 = 120.0;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InstrumentMap {
    tracks: BTreeMap<u8, usize>,
}

impl InstrumentMap {
    /// Assign output tracks to instruments, lowest instrument first.
    /// Instrument 0 means "no instrument" and never gets a track.
    pub fn new(instruments: impl IntoIterator<Item = u8>) -> Self {
        let mut numbers: Vec<u8> = instruments.into_iter().filter(|&i| i != 0).collect();
        numbers.sort_unstable();
        numbers.dedup();

        InstrumentMap {
            tracks: numbers
                .into_iter()
                .enumerate()
                .map(|(track, instrument)| (instrument, track))
                .collect(),
        }
    }

    pub fn for_pattern(pattern: &Pattern) -> Self {
        Self::new(pattern.instruments())
    }

    /// Built from the distinct patterns, so repeats in the chain do not matter
    pub fn for_song(song: &Song) -> Self {
        Self::new(song.instruments())
    }

    pub fn track_for(&self, instrument: u8) -> Option<usize> {
        self.tracks.get(&instrument).copied()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// `(instrument, track)` pairs in track order
    pub fn iter(&self) -> impl Iterator<Item = (u8, usize)> + '_ {
        self.tracks.iter().map(|(&instrument, &track)| (instrument, track))
    }
}

pub fn track_name(instrument: u8) -> String {
    format!("Instrument {:02}", instrument)
}

/// Everything needed to write one output file
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    pub bpm: f32,
    pub instruments: InstrumentMap,
    pub rendered: Rendered,
}

impl Timeline {
    /// End of the last note, in quarter notes
    pub fn end(&self) -> Fraction {
        self.rendered
            .events
            .iter()
            .map(|event| event.end())
            .max()
            .unwrap_or(Fraction::ZERO)
    }
}

/// Start time of each chain entry. Patterns play back to back, each one
/// as long as its first track.
pub fn chain_offsets(song: &Song) -> Vec<(u8, Fraction)> {
    let mut offset = Fraction::ZERO;
    song.patterns_in_order()
        .map(|(number, pattern)| {
            let start = offset;
            offset += pattern.duration();
            (number, start)
        })
        .collect()
}

pub fn sequence_pattern<R: Rng>(
    synth: &mut Synthesizer<R>,
    pattern: &Pattern,
    bpm: f32,
) -> Result<Timeline, StepError> {
    let instruments = InstrumentMap::for_pattern(pattern);
    let rendered = synth.render_pattern(pattern, None, &instruments, Fraction::ZERO)?;

    Ok(Timeline {
        bpm,
        instruments,
        rendered,
    })
}

pub fn sequence_song<R: Rng>(
    synth: &mut Synthesizer<R>,
    song: &Song,
) -> Result<Timeline, StepError> {
    let instruments = InstrumentMap::for_song(song);
    info!(
        "song: {} chain entries, {} patterns, {} instruments",
        song.pattern_chain().len(),
        song.patterns().len(),
        instruments.len()
    );

    let mut rendered = Rendered::default();
    for (number, offset) in chain_offsets(song) {
        let Some(pattern) = song.pattern(number) else {
            continue;
        };
        debug!(pattern = number, offset = %offset, "sequencing chain entry");
        rendered.append(synth.render_pattern(pattern, Some(number), &instruments, offset)?);
    }

    Ok(Timeline {
        bpm: song.bpm(),
        instruments,
        rendered,
    })
}
