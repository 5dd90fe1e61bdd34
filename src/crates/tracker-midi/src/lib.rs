//! Polyend Tracker to MIDI converter library
//!
//! Turns decoded patterns and projects into timed note events and writes
//! them out as Standard MIDI Files.

pub mod loader;
pub mod midi;
pub mod options;
pub mod output;
pub mod song;
pub mod synth;

#[cfg(test)]
mod synth_tests;

// Re-export main types for convenience
pub use loader::{load_pattern, load_project, ProjectLocation};
pub use midi::{timeline_to_midi, MidiError, MidiFile};
pub use options::ExportOptions;
pub use output::TextFormatter;
pub use song::{sequence_pattern, sequence_song, InstrumentMap, Timeline};
pub use synth::{NoteEvent, Rendered, StepError, SynthError, Synthesizer};
