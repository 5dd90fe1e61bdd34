//! Chord effect lookup table.
//!
//! A chord effect value selects one row of [`CHORD_TYPES`]. Each row lists
//! the semitone intervals played above the step's note; interval 0 is the
//! root itself.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::note::Note;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChordType {
    /// Effect value stored in the pattern file
    pub code: u8,
    /// Label shown in the tracker's effect column
    pub display_name: &'static str,
    pub verbose_name: &'static str,
    pub intervals: &'static [u8],
}

const fn chord(
    code: u8,
    display_name: &'static str,
    verbose_name: &'static str,
    intervals: &'static [u8],
) -> ChordType {
    ChordType {
        code,
        display_name,
        verbose_name,
        intervals,
    }
}

pub static CHORD_TYPES: [ChordType; 29] = [
    chord(1, "27", "Sus2", &[0, 2, 7]),
    chord(2, "28", "Sus2 #5", &[0, 2, 8]),
    chord(3, "36", "DimTriad", &[0, 3, 6]),
    chord(4, "37", "Min", &[0, 3, 7]),
    chord(5, "47", "Maj", &[0, 4, 7]),
    chord(6, "48", "AugTriad", &[0, 4, 8]),
    chord(7, "57", "Sus4", &[0, 5, 7]),
    chord(8, "5A", "Stack4", &[0, 5, 10]),
    chord(9, "5C", "Open4", &[0, 5]),
    chord(10, "67", "Sus #4", &[0, 6, 7]),
    chord(11, "07C", "Open5", &[0, 7]),
    chord(12, "07", "Stack5", &[0, 7, 14]),
    chord(13, "279", "Sus2add6", &[0, 2, 7, 9]),
    chord(14, "27A", "Sus2 b7", &[0, 2, 7, 10]),
    chord(15, "27B", "Sus2Maj7", &[0, 2, 7, 11]),
    chord(16, "369", "Dim7", &[0, 3, 6, 9]),
    chord(17, "36A", "HalfDim", &[0, 3, 6, 10]),
    chord(18, "378", "Min b6", &[0, 3, 7, 8]),
    chord(19, "379", "Min6", &[0, 3, 7, 9]),
    chord(20, "37A", "Min7", &[0, 3, 7, 10]),
    chord(21, "37B", "MinMaj7", &[0, 3, 7, 11]),
    chord(22, "479", "Maj6", &[0, 4, 7, 9]),
    chord(23, "47A", "Dom7", &[0, 4, 7, 10]),
    chord(24, "47B", "Maj7", &[0, 4, 7, 11]),
    chord(25, "489", "Aug add6", &[0, 4, 8, 9]),
    chord(26, "48A", "Aug b7", &[0, 4, 8, 10]),
    chord(27, "48B", "AugMaj7", &[0, 4, 8, 11]),
    chord(28, "57A", "Sus4 b7", &[0, 5, 7, 10]),
    chord(29, "57B", "Sus4Maj7", &[0, 5, 7, 11]),
];

impl ChordType {
    /// Look up a chord type by effect value. Value 0 (chord cleared) is not
    /// a chord and fails like any other unknown code.
    pub fn from_code(code: u8) -> Result<&'static ChordType> {
        CHORD_TYPES
            .iter()
            .find(|chord_type| chord_type.code == code)
            .ok_or(Error::UnknownChordCode(code))
    }

    pub fn from_intervals(intervals: &[u8]) -> Result<&'static ChordType> {
        CHORD_TYPES
            .iter()
            .find(|chord_type| chord_type.intervals == intervals)
            .ok_or_else(|| Error::UnknownChordIntervals(intervals.to_vec()))
    }

    pub fn chord(&self, root: Note) -> Chord {
        Chord::new(root, self.intervals.to_vec())
    }
}

/// Interval set for a chord effect value
pub fn chord_from_code(code: u8) -> Result<&'static [u8]> {
    ChordType::from_code(code).map(|chord_type| chord_type.intervals)
}

/// Effect value for an interval set
pub fn code_from_intervals(intervals: &[u8]) -> Result<u8> {
    ChordType::from_intervals(intervals).map(|chord_type| chord_type.code)
}

/// Notes sounded together from one root note
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chord {
    pub root: Note,
    pub intervals: Vec<u8>,
}

impl Chord {
    pub fn new(root: Note, intervals: Vec<u8>) -> Self {
        Chord { root, intervals }
    }

    pub fn from_code(root: Note, code: u8) -> Result<Chord> {
        Ok(ChordType::from_code(code)?.chord(root))
    }

    /// Notes in interval order; a root not listed with interval 0 is not played
    pub fn notes(&self) -> Result<Vec<Note>> {
        self.intervals
            .iter()
            .map(|&interval| self.root.transpose(interval))
            .collect()
    }

    pub fn chord_type(&self) -> Result<&'static ChordType> {
        ChordType::from_intervals(&self.intervals)
    }

    pub fn code(&self) -> Result<u8> {
        code_from_intervals(&self.intervals)
    }
}
