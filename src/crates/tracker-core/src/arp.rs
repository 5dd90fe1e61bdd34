//! Arpeggio effect lookup table.
//!
//! The tracker shows arpeggio types as three-character labels such as `/ 4`
//! or `R.3`. The first character is the direction, a `.` marks a fraction of
//! a step and the last digit is the division. [`ARP_TYPES`] is generated from
//! those labels once, at compile time.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use std::fmt;

use crate::chord::Chord;
use crate::error::{Error, Result};
use crate::fraction::Fraction;
use crate::note::Note;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ArpDirection {
    Ascending,
    Descending,
    Random,
}

impl fmt::Display for ArpDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArpDirection::Ascending => write!(f, "ascending"),
            ArpDirection::Descending => write!(f, "descending"),
            ArpDirection::Random => write!(f, "random"),
        }
    }
}

/// Length of one arpeggio note, in grid steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ArpDivision {
    /// Each note lasts this many steps
    Steps(u8),
    /// Each step is split into this many notes
    PerStep(u8),
}

impl ArpDivision {
    pub fn steps(self) -> Fraction {
        match self {
            ArpDivision::Steps(n) => Fraction::from_int(n as i64),
            ArpDivision::PerStep(n) => Fraction::new(1, n as i64),
        }
    }
}

impl fmt::Display for ArpDivision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.steps())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ArpType {
    /// Effect value stored in the pattern file
    pub code: u8,
    pub display_name: &'static str,
    /// The tracker has no longer label for arpeggios; same as `display_name`
    pub verbose_name: &'static str,
    pub direction: ArpDirection,
    pub division: ArpDivision,
}

/// Labels in effect value order; value `n` is `ARP_NAMES[n - 1]`
const ARP_NAMES: [&str; 33] = [
    "/ 8", "/ 6", "/ 4", "/ 3", "/ 2", "/ 1", "/.2", "/.3", "/.4", "/.6", "/.8",
    "\\ 8", "\\ 6", "\\ 4", "\\ 3", "\\ 2", "\\ 1", "\\.2", "\\.3", "\\.4", "\\.6", "\\.8",
    "R 8", "R 6", "R 4", "R 3", "R 2", "R 1", "R.2", "R.3", "R.4", "R.6", "R.8",
];

const fn parse_arp_name(code: u8, name: &'static str) -> ArpType {
    let bytes = name.as_bytes();
    let direction = match bytes[0] {
        b'/' => ArpDirection::Ascending,
        b'\\' => ArpDirection::Descending,
        b'R' | b'r' => ArpDirection::Random,
        _ => panic!("unknown arpeggio direction character"),
    };

    let last = bytes[bytes.len() - 1];
    if !last.is_ascii_digit() || last == b'0' {
        panic!("unknown arpeggio division character");
    }
    let digit = last - b'0';

    let mut fractional = false;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'.' {
            fractional = true;
        }
        i += 1;
    }

    ArpType {
        code,
        display_name: name,
        verbose_name: name,
        direction,
        division: if fractional {
            ArpDivision::PerStep(digit)
        } else {
            ArpDivision::Steps(digit)
        },
    }
}

const fn build_arp_table() -> [ArpType; 33] {
    let mut table = [parse_arp_name(1, ARP_NAMES[0]); 33];
    let mut i = 1;
    while i < ARP_NAMES.len() {
        table[i] = parse_arp_name(i as u8 + 1, ARP_NAMES[i]);
        i += 1;
    }
    table
}

pub static ARP_TYPES: [ArpType; 33] = build_arp_table();

impl ArpType {
    /// Look up an arpeggio type by effect value. Value 0 clears a running
    /// arpeggio and is never a table entry.
    pub fn from_code(code: u8) -> Result<&'static ArpType> {
        ARP_TYPES
            .iter()
            .find(|arp_type| arp_type.code == code)
            .ok_or(Error::UnknownArpCode(code))
    }

    pub fn from_shape(direction: ArpDirection, division: ArpDivision) -> Result<&'static ArpType> {
        ARP_TYPES
            .iter()
            .find(|arp_type| arp_type.direction == direction && arp_type.division == division)
            .ok_or_else(|| Error::UnknownArpShape {
                direction: direction.to_string(),
                division: division.to_string(),
            })
    }

    pub fn arp(&self, chord: Chord) -> Arp {
        Arp {
            chord,
            direction: self.direction,
            division: self.division,
        }
    }
}

pub fn arp_from_code(code: u8) -> Result<(ArpDirection, ArpDivision)> {
    ArpType::from_code(code).map(|arp_type| (arp_type.direction, arp_type.division))
}

pub fn code_from_arp(direction: ArpDirection, division: ArpDivision) -> Result<u8> {
    ArpType::from_shape(direction, division).map(|arp_type| arp_type.code)
}

/// A chord played one note at a time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Arp {
    pub chord: Chord,
    pub direction: ArpDirection,
    pub division: ArpDivision,
}

impl Arp {
    pub fn code(&self) -> Result<u8> {
        code_from_arp(self.direction, self.division)
    }

    /// Endless sequence of notes to play. A fresh cycle restarts from the
    /// first note, so every retrigger begins at the same place.
    pub fn cycle<'r, R: Rng + ?Sized>(&self, rng: &'r mut R) -> Result<ArpCycle<'r, R>> {
        let mut notes = self.chord.notes()?;
        if self.direction == ArpDirection::Descending {
            notes.reverse();
        }
        Ok(ArpCycle {
            notes,
            direction: self.direction,
            position: 0,
            rng,
        })
    }
}

pub struct ArpCycle<'r, R: Rng + ?Sized> {
    notes: Vec<Note>,
    direction: ArpDirection,
    position: usize,
    rng: &'r mut R,
}

impl<R: Rng + ?Sized> Iterator for ArpCycle<'_, R> {
    type Item = Note;

    fn next(&mut self) -> Option<Note> {
        if self.notes.is_empty() {
            return None;
        }
        match self.direction {
            // independent draws, a note may repeat
            ArpDirection::Random => self.notes.choose(self.rng).copied(),
            ArpDirection::Ascending | ArpDirection::Descending => {
                let note = self.notes[self.position % self.notes.len()];
                self.position += 1;
                Some(note)
            }
        }
    }
}
