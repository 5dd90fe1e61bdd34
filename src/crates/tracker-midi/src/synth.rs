//! Step grid to timed notes.
//!
//! The tracker never stores how long a note lasts: a note rings until the
//! next step on the same track that holds anything (another note or an
//! OFF/CUT/FADE marker), or until the end of the pattern. Chords fan out
//! into simultaneous notes with that duration; arpeggios cycle through the
//! chord in division-sized slices, the last one clipped to the same end.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::fmt;
use tracing::{debug, warn};
use tracker_core::{Error, ErrorCategory, Fraction, Note, Pattern, Step, Track, STEP_BEATS};

use crate::song::InstrumentMap;

/// A note with absolute timing in quarter notes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteEvent {
    /// Tracker instrument that plays the note
    pub instrument: u8,
    /// Output track assigned to the instrument
    pub track: usize,
    /// MIDI key number
    pub key: u8,
    pub start: Fraction,
    pub duration: Fraction,
}

impl NoteEvent {
    pub fn end(&self) -> Fraction {
        self.start + self.duration
    }
}

/// Where a step lives inside a song
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepLocation {
    /// Pattern number, when rendering as part of a project
    pub pattern: Option<u8>,
    pub track: usize,
    pub step: usize,
}

impl fmt::Display for StepLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(pattern) = self.pattern {
            write!(f, "pattern {}, ", pattern)?;
        }
        write!(f, "track {}, step {}", self.track + 1, self.step)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SynthError {
    #[error(transparent)]
    Core(#[from] Error),

    #[error("instrument {0} has no output track")]
    UnmappedInstrument(u8),
}

impl SynthError {
    /// Contract violations, such as asking for the pitch of a marker, mean
    /// the synthesizer itself is wrong, so the whole render stops. Every
    /// other error only skips the step.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SynthError::Core(e) if e.category() == ErrorCategory::InvalidArgument)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{location}: {source}")]
pub struct StepError {
    pub location: StepLocation,
    #[source]
    pub source: SynthError,
}

/// Events produced by a render, plus the steps that had to be skipped
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rendered {
    pub events: Vec<NoteEvent>,
    pub skipped: Vec<StepError>,
}

impl Rendered {
    pub fn append(&mut self, mut other: Rendered) {
        self.events.append(&mut other.events);
        self.skipped.append(&mut other.skipped);
    }
}

/// Index of the step that stops the note started at `index`: the next
/// live step holding a note or a marker, or the track length if none does.
pub fn note_end(track: &Track, index: usize) -> usize {
    let steps = track.live_steps();
    (index + 1..steps.len())
        .find(|&i| !steps[i].is_empty())
        .unwrap_or(steps.len())
}

/// Time of a grid position in quarter notes
pub fn step_time(index: usize) -> Fraction {
    Fraction::from(index) * STEP_BEATS
}

pub struct Synthesizer<R = StdRng> {
    rng: R,
}

impl Synthesizer<StdRng> {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Random arpeggios come out the same on every run with the same seed
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for Synthesizer<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> Synthesizer<R> {
    pub fn with_rng(rng: R) -> Self {
        Synthesizer { rng }
    }

    /// Render every track of a pattern, shifted by `offset` quarter notes
    pub fn render_pattern(
        &mut self,
        pattern: &Pattern,
        number: Option<u8>,
        instruments: &InstrumentMap,
        offset: Fraction,
    ) -> Result<Rendered, StepError> {
        let mut rendered = Rendered::default();
        for (index, track) in pattern.tracks().iter().enumerate() {
            let location = StepLocation {
                pattern: number,
                track: index,
                step: 0,
            };
            rendered.append(self.render_track(track, location, instruments, offset)?);
        }
        debug!(
            pattern = ?number,
            events = rendered.events.len(),
            skipped = rendered.skipped.len(),
            "rendered pattern"
        );
        Ok(rendered)
    }

    /// Render one track. Steps whose ornament cannot be resolved are
    /// skipped and reported; they are never played as plain notes.
    pub fn render_track(
        &mut self,
        track: &Track,
        location: StepLocation,
        instruments: &InstrumentMap,
        offset: Fraction,
    ) -> Result<Rendered, StepError> {
        let mut rendered = Rendered::default();

        for (index, step) in track.live_steps().iter().enumerate() {
            // markers only end notes, which note_end already accounts for
            if !step.is_note() {
                continue;
            }

            let location = StepLocation {
                step: index,
                ..location
            };
            match self.render_step(track, index, step, instruments, offset) {
                Ok(mut events) => rendered.events.append(&mut events),
                Err(source) => {
                    let error = StepError { location, source };
                    if error.source.is_fatal() {
                        return Err(error);
                    }
                    warn!("skipping {}", error);
                    rendered.skipped.push(error);
                }
            }
        }

        Ok(rendered)
    }

    fn render_step(
        &mut self,
        track: &Track,
        index: usize,
        step: &Step,
        instruments: &InstrumentMap,
        offset: Fraction,
    ) -> Result<Vec<NoteEvent>, SynthError> {
        let output = instruments
            .track_for(step.instrument)
            .ok_or(SynthError::UnmappedInstrument(step.instrument))?;
        let event = |note: Note, start: Fraction, duration: Fraction| {
            Ok::<_, SynthError>(NoteEvent {
                instrument: step.instrument,
                track: output,
                key: note.midi_key()?,
                start: offset + start,
                duration,
            })
        };

        let start = step_time(index);
        let end = step_time(note_end(track, index));
        let mut events = Vec::new();

        if let Some(arp) = step.arp()? {
            let note_length = arp.division.steps() * STEP_BEATS;
            let mut note_start = start;
            for note in arp.cycle(&mut self.rng)? {
                if note_start >= end {
                    break;
                }
                let duration = if note_start + note_length >= end {
                    end - note_start
                } else {
                    note_length
                };
                events.push(event(note, note_start, duration)?);
                // advance by the full division even after clipping
                note_start += note_length;
            }
        } else if let Some(chord) = step.chord()? {
            for note in chord.notes()? {
                events.push(event(note, start, end - start)?);
            }
        } else {
            events.push(event(step.note, start, end - start)?);
        }

        Ok(events)
    }
}
