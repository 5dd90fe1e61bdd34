use serde::Serialize;
use std::fmt;

use crate::arp::{Arp, ArpType};
use crate::chord::Chord;
use crate::effect::Effect;
use crate::error::{Error, Result};
use crate::note::Note;

/// One sequencer cell: a note, an instrument and two effect slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Step {
    pub note: Note,
    /// 0 means no instrument is set
    pub instrument: u8,
    pub fx1: Effect,
    pub fx2: Effect,
}

impl Step {
    pub const PAYLOAD_LENGTH: usize = 6;

    const NOTE_OFFSET: usize = 0;
    const INSTRUMENT_OFFSET: usize = 1;
    const FX2_TYPE_OFFSET: usize = 2;
    const FX2_VALUE_OFFSET: usize = 3;
    const FX1_TYPE_OFFSET: usize = 4;
    const FX1_VALUE_OFFSET: usize = 5;

    pub const EMPTY: Step = Step {
        note: Note::EMPTY,
        instrument: 0,
        fx1: Effect::NONE,
        fx2: Effect::NONE,
    };

    pub fn new(note: Note, instrument: u8) -> Self {
        Step {
            note,
            instrument,
            ..Step::EMPTY
        }
    }

    pub fn with_fx1(mut self, effect: Effect) -> Self {
        self.fx1 = effect;
        self
    }

    pub fn with_fx2(mut self, effect: Effect) -> Self {
        self.fx2 = effect;
        self
    }

    pub fn from_bytes(data: &[u8]) -> Result<Step> {
        if data.len() != Self::PAYLOAD_LENGTH {
            return Err(Error::malformed_length("step", Self::PAYLOAD_LENGTH, data.len()));
        }

        Ok(Step {
            note: Note::new(data[Self::NOTE_OFFSET]),
            instrument: data[Self::INSTRUMENT_OFFSET],
            fx1: Effect::from_raw(data[Self::FX1_TYPE_OFFSET], data[Self::FX1_VALUE_OFFSET]),
            fx2: Effect::from_raw(data[Self::FX2_TYPE_OFFSET], data[Self::FX2_VALUE_OFFSET]),
        })
    }

    pub fn to_bytes(&self) -> [u8; Self::PAYLOAD_LENGTH] {
        let mut data = [0u8; Self::PAYLOAD_LENGTH];
        data[Self::NOTE_OFFSET] = self.note.value();
        data[Self::INSTRUMENT_OFFSET] = self.instrument;
        data[Self::FX2_TYPE_OFFSET] = self.fx2.kind.code();
        data[Self::FX2_VALUE_OFFSET] = self.fx2.value;
        data[Self::FX1_TYPE_OFFSET] = self.fx1.kind.code();
        data[Self::FX1_VALUE_OFFSET] = self.fx1.value;
        data
    }

    pub fn effects(&self) -> [&Effect; 2] {
        [&self.fx1, &self.fx2]
    }

    /// The step starts a new sounding note
    pub fn is_note(&self) -> bool {
        self.note.is_pitched()
    }

    /// The step stops whatever note is playing (OFF, CUT or FADE)
    pub fn is_note_off(&self) -> bool {
        self.note.is_disabling()
    }

    pub fn is_empty(&self) -> bool {
        self.note.is_empty()
    }

    pub fn chord_effect(&self) -> Option<&Effect> {
        self.effects().into_iter().find(|fx| fx.is_chord())
    }

    pub fn arp_effect(&self) -> Option<&Effect> {
        self.effects().into_iter().find(|fx| fx.is_arp())
    }

    /// An arpeggio effect with value 0, which stops a running arpeggio
    pub fn clears_arp(&self) -> bool {
        self.effects().into_iter().any(|fx| fx.is_arp_clear())
    }

    /// Chord played by this step, if it is a note with a chord effect
    pub fn chord(&self) -> Result<Option<Chord>> {
        if !self.is_note() {
            return Ok(None);
        }
        match self.chord_effect() {
            Some(fx) => Chord::from_code(self.note, fx.value).map(Some),
            None => Ok(None),
        }
    }

    /// Arpeggio played by this step. An arpeggio needs a chord to cycle
    /// through, so an arpeggio effect without a chord yields nothing.
    pub fn arp(&self) -> Result<Option<Arp>> {
        let Some(fx) = self.arp_effect() else {
            return Ok(None);
        };
        match self.chord()? {
            Some(chord) => Ok(Some(ArpType::from_code(fx.value)?.arp(chord))),
            None => Ok(None),
        }
    }
}

impl Default for Step {
    fn default() -> Self {
        Step::EMPTY
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let instrument = if self.instrument == 0 {
            "--".to_string()
        } else {
            format!("{:02}", self.instrument)
        };
        write!(f, "{:<3} {} {} {}", self.note.to_string(), instrument, self.fx1, self.fx2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arp::ArpDirection;
    use crate::effect::{EffectKind, EffectType};

    #[test]
    fn test_decode_field_order() {
        let step = Step::from_bytes(&[48, 3, 0x1F, 20, 0x12, 64]).unwrap();
        assert_eq!(step.note, Note::new(48));
        assert_eq!(step.instrument, 3);
        assert_eq!(step.fx1, Effect::new(EffectKind::Volume, 64));
        assert_eq!(step.fx2, Effect::new(EffectKind::Panning, 20));
    }

    #[test]
    fn test_encode_matches_decode() {
        let bytes = [50, 1, 0x7E, 1, 0x02, 5];
        let step = Step::from_bytes(&bytes).unwrap();
        assert_eq!(step.fx2.kind, EffectType::Unknown(0x7E));
        assert_eq!(step.to_bytes(), bytes);
    }

    #[test]
    fn test_wrong_length() {
        assert_eq!(
            Step::from_bytes(&[0; 5]),
            Err(Error::malformed_length("step", 6, 5))
        );
    }

    #[test]
    fn test_chord_on_either_slot() {
        let on_fx1 = Step::new(Note::new(48), 1).with_fx1(Effect::new(EffectKind::Chord, 4));
        let on_fx2 = Step::new(Note::new(48), 1).with_fx2(Effect::new(EffectKind::Chord, 4));
        assert_eq!(on_fx1.chord().unwrap(), on_fx2.chord().unwrap());
        assert!(on_fx1.chord().unwrap().is_some());
    }

    #[test]
    fn test_cleared_chord_is_no_chord() {
        let step = Step::new(Note::new(48), 1).with_fx1(Effect::new(EffectKind::Chord, 0));
        assert_eq!(step.chord(), Ok(None));
    }

    #[test]
    fn test_arp_needs_chord() {
        let step = Step::new(Note::new(48), 1).with_fx1(Effect::new(EffectKind::Arpeggio, 3));
        assert_eq!(step.arp(), Ok(None));

        let step = step.with_fx2(Effect::new(EffectKind::Chord, 5));
        let arp = step.arp().unwrap().unwrap();
        assert_eq!(arp.direction, ArpDirection::Ascending);
        assert_eq!(arp.chord.intervals, vec![0, 4, 7]);
    }

    #[test]
    fn test_unknown_ornament_codes_fail() {
        let step = Step::new(Note::new(48), 1).with_fx1(Effect::new(EffectKind::Chord, 99));
        assert_eq!(step.chord(), Err(Error::UnknownChordCode(99)));

        let step = Step::new(Note::new(48), 1)
            .with_fx1(Effect::new(EffectKind::Chord, 5))
            .with_fx2(Effect::new(EffectKind::Arpeggio, 60));
        assert_eq!(step.arp(), Err(Error::UnknownArpCode(60)));
    }

    #[test]
    fn test_arp_clear_marker() {
        let step = Step::new(Note::EMPTY, 0).with_fx1(Effect::new(EffectKind::Arpeggio, 0));
        assert!(step.clears_arp());
        assert_eq!(step.arp(), Ok(None));
    }

    #[test]
    fn test_ornaments_ignored_on_markers() {
        let step = Step::new(Note::OFF, 1).with_fx1(Effect::new(EffectKind::Chord, 99));
        assert_eq!(step.chord(), Ok(None));
    }
}
