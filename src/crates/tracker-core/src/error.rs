use crate::note::Note;

pub type Result<T> = std::result::Result<T, Error>;

/// Broad class of an [`Error`], used by callers to decide whether a failure
/// aborts the whole export or only the offending step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Wrong buffer sizes, counts or ranges in the binary input.
    MalformedInput,
    /// A chord or arpeggio code (or shape) missing from the lookup tables.
    UnknownOrnament,
    /// Valid tracker data that has no MIDI equivalent, such as a pitch
    /// above key 127. Only the affected step is lost.
    Unplayable,
    /// A caller asked for something the value cannot provide.
    InvalidArgument,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("expected {entity} payload of {expected} bytes, got {actual} instead")]
    MalformedLength {
        entity: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("track length must be in 1..=128, got {0}")]
    InvalidTrackLength(usize),

    #[error("{entity} must have exactly {expected} entries, got {actual}")]
    InvalidCount {
        entity: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("step index {index} is past the last step slot {last}")]
    StepIndexOutOfRange { index: usize, last: usize },

    #[error("song can hold at most {max} patterns, got {actual}")]
    SongTooLong { max: usize, actual: usize },

    #[error("pattern chain references pattern {0}, which is not in the pattern mapping")]
    MissingPattern(u8),

    #[error("unknown chord type code {0}")]
    UnknownChordCode(u8),

    #[error("unknown arpeggio type code {0}")]
    UnknownArpCode(u8),

    #[error("no chord type has intervals {0:?}")]
    UnknownChordIntervals(Vec<u8>),

    #[error("no arpeggio type plays {direction} every {division} steps")]
    UnknownArpShape { direction: String, division: String },

    #[error("note {root} + {interval} semitones is outside the playable range")]
    NoteOutOfRange { root: Note, interval: u8 },

    #[error("note {0} has no pitch")]
    NotPitched(Note),

    #[error("pitch {0} does not fit in a MIDI key")]
    PitchOutOfRange(u16),
}

impl Error {
    pub fn malformed_length(entity: &'static str, expected: usize, actual: usize) -> Self {
        Error::MalformedLength {
            entity,
            expected,
            actual,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::MalformedLength { .. }
            | Error::InvalidTrackLength(_)
            | Error::InvalidCount { .. }
            | Error::SongTooLong { .. }
            | Error::MissingPattern(_) => ErrorCategory::MalformedInput,
            Error::UnknownChordCode(_)
            | Error::UnknownArpCode(_)
            | Error::UnknownChordIntervals(_)
            | Error::UnknownArpShape { .. } => ErrorCategory::UnknownOrnament,
            Error::NoteOutOfRange { .. } | Error::PitchOutOfRange(_) => ErrorCategory::Unplayable,
            Error::StepIndexOutOfRange { .. } | Error::NotPitched(_) => {
                ErrorCategory::InvalidArgument
            }
        }
    }
}
