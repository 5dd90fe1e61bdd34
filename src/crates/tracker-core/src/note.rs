use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Note names in chromatic order, starting from C
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// A single note cell value as stored by the tracker.
///
/// Values `0..=251` are pitched notes counted in semitones from C0. The top
/// four values are markers: `OFF`, `CUT` and `FADE` stop the currently
/// sounding note, `EMPTY` means nothing happens on the step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Note(u8);

impl Note {
    pub const OFF: Note = Note(0xFC);
    pub const CUT: Note = Note(0xFD);
    pub const FADE: Note = Note(0xFE);
    pub const EMPTY: Note = Note(0xFF);

    /// Highest value that still carries a pitch
    pub const MAX_PITCHED: u8 = 0xFB;

    /// Offset between tracker pitch and MIDI key: tracker C4 is 48, MIDI C4 is 60
    pub const MIDI_OFFSET: u8 = 12;

    pub const fn new(value: u8) -> Self {
        Note(value)
    }

    pub const fn value(self) -> u8 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self == Note::EMPTY
    }

    /// OFF, CUT and FADE all end the note that is currently playing
    pub fn is_disabling(self) -> bool {
        matches!(self, Note::OFF | Note::CUT | Note::FADE)
    }

    pub fn is_pitched(self) -> bool {
        self.0 <= Self::MAX_PITCHED
    }

    /// Octave number, so that value 48 is octave 4
    pub fn octave(self) -> u8 {
        self.0 / 12
    }

    /// Display name without octave; markers get their three-letter label
    pub fn name(self) -> &'static str {
        match self {
            Note::EMPTY => "---",
            Note::OFF => "OFF",
            Note::CUT => "CUT",
            Note::FADE => "FAD",
            _ => NOTE_NAMES[(self.0 % 12) as usize],
        }
    }

    /// Note `semitones` above this one. Fails if the result leaves the
    /// pitched range, or if this note has no pitch to begin with.
    pub fn transpose(self, semitones: u8) -> Result<Note> {
        if !self.is_pitched() {
            return Err(Error::NotPitched(self));
        }
        let value = self.0 as u16 + semitones as u16;
        if value > Self::MAX_PITCHED as u16 {
            return Err(Error::NoteOutOfRange {
                root: self,
                interval: semitones,
            });
        }
        Ok(Note(value as u8))
    }

    /// MIDI key number for this note.
    ///
    /// Asking for the key of an empty or disabling note is a logic error on
    /// the caller's side and is reported as [`Error::NotPitched`].
    pub fn midi_key(self) -> Result<u8> {
        if !self.is_pitched() {
            return Err(Error::NotPitched(self));
        }
        let key = self.0 as u16 + Self::MIDI_OFFSET as u16;
        if key > 127 {
            return Err(Error::PitchOutOfRange(key));
        }
        Ok(key as u8)
    }
}

impl From<u8> for Note {
    fn from(value: u8) -> Self {
        Note(value)
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_pitched() {
            write!(f, "{}{}", self.name(), self.octave())
        } else {
            write!(f, "{}", self.name())
        }
    }
}
