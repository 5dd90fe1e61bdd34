use serde::{Deserialize, Serialize};
use std::fmt;

/// Effects whose type code is understood by this crate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    None,
    Arpeggio,
    Chord,
    Volume,
    Panning,
}

impl EffectKind {
    pub const ALL: [EffectKind; 5] = [
        EffectKind::None,
        EffectKind::Arpeggio,
        EffectKind::Chord,
        EffectKind::Volume,
        EffectKind::Panning,
    ];

    pub fn code(self) -> u8 {
        match self {
            EffectKind::None => 0x00,
            EffectKind::Arpeggio => 0x01,
            EffectKind::Chord => 0x02,
            EffectKind::Volume => 0x12,
            EffectKind::Panning => 0x1F,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.code() == code)
    }

    /// Single letter the tracker UI shows in the effect column
    pub fn short_name(self) -> &'static str {
        match self {
            EffectKind::None => "-",
            EffectKind::Arpeggio => "A",
            EffectKind::Chord => "C",
            EffectKind::Volume => "V",
            EffectKind::Panning => "P",
        }
    }
}

/// Effect type as decoded from a step.
///
/// Codes this crate does not know about are kept verbatim so newer firmware
/// files still decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectType {
    Known(EffectKind),
    Unknown(u8),
}

impl EffectType {
    pub fn from_code(code: u8) -> Self {
        match EffectKind::from_code(code) {
            Some(kind) => EffectType::Known(kind),
            None => EffectType::Unknown(code),
        }
    }

    pub fn code(self) -> u8 {
        match self {
            EffectType::Known(kind) => kind.code(),
            EffectType::Unknown(code) => code,
        }
    }

    pub fn is(self, kind: EffectKind) -> bool {
        self == EffectType::Known(kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Effect {
    pub kind: EffectType,
    pub value: u8,
}

impl Effect {
    pub const NONE: Effect = Effect {
        kind: EffectType::Known(EffectKind::None),
        value: 0,
    };

    pub fn new(kind: EffectKind, value: u8) -> Self {
        Effect {
            kind: EffectType::Known(kind),
            value,
        }
    }

    pub fn from_raw(type_code: u8, value: u8) -> Self {
        Effect {
            kind: EffectType::from_code(type_code),
            value,
        }
    }

    /// A chord effect with value 0 means the chord was cleared
    pub fn is_chord(&self) -> bool {
        self.kind.is(EffectKind::Chord) && self.value != 0
    }

    pub fn is_arp(&self) -> bool {
        self.kind.is(EffectKind::Arpeggio) && self.value != 0
    }

    /// Arpeggio effect with value 0: stops a running arpeggio
    pub fn is_arp_clear(&self) -> bool {
        self.kind.is(EffectKind::Arpeggio) && self.value == 0
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            EffectType::Known(EffectKind::None) => write!(f, "---"),
            EffectType::Known(kind) => write!(f, "{}{:02}", kind.short_name(), self.value),
            EffectType::Unknown(code) => write!(f, "?{:02X}{:02}", code, self.value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        assert_eq!(EffectType::from_code(0x12), EffectType::Known(EffectKind::Volume));
        assert_eq!(EffectType::from_code(0x1F), EffectType::Known(EffectKind::Panning));
        for kind in EffectKind::ALL {
            assert_eq!(EffectKind::from_code(kind.code()), Some(kind));
        }
    }

    #[test]
    fn test_unknown_code_is_preserved() {
        let effect = Effect::from_raw(0x7E, 9);
        assert_eq!(effect.kind, EffectType::Unknown(0x7E));
        assert_eq!(effect.kind.code(), 0x7E);
        assert!(!effect.is_chord());
        assert!(!effect.is_arp());
    }

    #[test]
    fn test_zero_value_ornaments() {
        assert!(!Effect::new(EffectKind::Chord, 0).is_chord());
        assert!(Effect::new(EffectKind::Chord, 5).is_chord());
        assert!(Effect::new(EffectKind::Arpeggio, 0).is_arp_clear());
        assert!(!Effect::new(EffectKind::Arpeggio, 0).is_arp());
    }

    #[test]
    fn test_display() {
        assert_eq!(Effect::new(EffectKind::Volume, 64).to_string(), "V64");
        assert_eq!(Effect::NONE.to_string(), "---");
    }
}
