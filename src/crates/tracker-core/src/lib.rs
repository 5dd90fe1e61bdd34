//! Core types for Polyend Tracker project and pattern files
//!
//! This crate decodes the tracker's fixed-layout binary files into a
//! pattern/track/step model and provides the chord and arpeggio tables
//! needed to interpret ornament effects.
//!
//! # Examples
//!
//! ```
//! use tracker_core::{Note, Pattern, Step, Track};
//!
//! let mut track = Track::empty(16).unwrap();
//! track.set_step(0, Step::new(Note::new(48), 1)).unwrap();
//!
//! let mut tracks = vec![Track::empty(16).unwrap(); Pattern::NUMBER_OF_TRACKS];
//! tracks[0] = track;
//! let pattern = Pattern::new(tracks).unwrap();
//!
//! let decoded = Pattern::from_bytes(&pattern.to_bytes()).unwrap();
//! assert_eq!(decoded.tracks()[0].steps()[0].note.to_string(), "C4");
//! ```
//!
//! # Main Components
//!
//! - **Note / Effect / Step**: a single sequencer cell and its parts
//! - **Track / Pattern**: 128-step voices grouped in eights
//! - **Song / Project**: the pattern chain, tempo and distinct patterns
//! - **Chord / Arp**: ornament lookup tables keyed by effect value
//! - **Fraction**: exact musical time in quarter notes

pub mod arp;
pub mod chord;
pub mod effect;
pub mod error;
pub mod fraction;
pub mod note;
pub mod pattern;
pub mod project;
pub mod step;
pub mod track;

pub use arp::{Arp, ArpCycle, ArpDirection, ArpDivision, ArpType, ARP_TYPES};
pub use chord::{Chord, ChordType, CHORD_TYPES};
pub use effect::{Effect, EffectKind, EffectType};
pub use error::{Error, ErrorCategory, Result};
pub use fraction::Fraction;
pub use note::{Note, NOTE_NAMES};
pub use pattern::{Pattern, STEP_BEATS};
pub use project::{Project, Song};
pub use step::Step;
pub use track::Track;
