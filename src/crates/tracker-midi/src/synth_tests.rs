// Timing engine scenarios: note lengths, chords, arpeggios and songs

#[cfg(test)]
mod tests {
    use crate::song::{sequence_pattern, sequence_song, InstrumentMap};
    use crate::synth::{note_end, NoteEvent, Rendered, SynthError, Synthesizer};
    use proptest::prelude::*;
    use std::collections::BTreeMap;
    use tracker_core::{Effect, EffectKind, Error, Fraction, Note, Pattern, Song, Step, Track};

    const CHORD_MAJOR: u8 = 5;
    const ARP_UP_3_STEPS: u8 = 4;
    const ARP_UP_THIRD_STEP: u8 = 8;
    const ARP_DOWN_1_STEP: u8 = 17;
    const ARP_RANDOM_1_STEP: u8 = 28;

    fn note(value: u8) -> Step {
        Step::new(Note::new(value), 1)
    }

    fn chord(value: u8, code: u8) -> Step {
        note(value).with_fx1(Effect::new(EffectKind::Chord, code))
    }

    fn arp(value: u8, chord_code: u8, arp_code: u8) -> Step {
        chord(value, chord_code).with_fx2(Effect::new(EffectKind::Arpeggio, arp_code))
    }

    fn off() -> Step {
        Step::new(Note::OFF, 0)
    }

    /// Pattern whose first track holds `steps`; the other tracks stay empty
    fn pattern(length: usize, steps: &[(usize, Step)]) -> Pattern {
        let mut tracks = vec![Track::empty(length).unwrap(); Pattern::NUMBER_OF_TRACKS];
        for &(index, step) in steps {
            tracks[0].set_step(index, step).unwrap();
        }
        Pattern::new(tracks).unwrap()
    }

    fn render_seeded(pattern: &Pattern, seed: u64) -> Rendered {
        let instruments = InstrumentMap::for_pattern(pattern);
        Synthesizer::seeded(seed)
            .render_pattern(pattern, None, &instruments, Fraction::ZERO)
            .unwrap()
    }

    fn render(pattern: &Pattern) -> Rendered {
        render_seeded(pattern, 0)
    }

    fn keys(events: &[NoteEvent]) -> Vec<u8> {
        events.iter().map(|e| e.key).collect()
    }

    fn q(numerator: i64, denominator: i64) -> Fraction {
        Fraction::new(numerator, denominator)
    }

    // ---- note length ----

    #[test]
    fn test_note_ends_at_off() {
        let rendered = render(&pattern(16, &[(0, note(48)), (5, off())]));
        assert_eq!(rendered.events.len(), 1);
        assert_eq!(rendered.events[0].duration, q(5, 4));
    }

    #[test]
    fn test_note_rings_to_pattern_end() {
        let rendered = render(&pattern(8, &[(0, note(48))]));
        assert_eq!(rendered.events[0].duration, q(2, 1));
    }

    #[test]
    fn test_next_note_ends_previous() {
        let rendered = render(&pattern(16, &[(0, note(48)), (3, note(50))]));
        assert_eq!(rendered.events.len(), 2);
        assert_eq!(rendered.events[0].duration, q(3, 4));
        assert_eq!(rendered.events[1].start, q(3, 4));
        assert_eq!(rendered.events[1].duration, q(13, 4));
    }

    #[test]
    fn test_cut_and_fade_end_notes() {
        let rendered = render(&pattern(
            16,
            &[
                (0, note(48)),
                (2, Step::new(Note::CUT, 0)),
                (4, note(48)),
                (7, Step::new(Note::FADE, 0)),
            ],
        ));
        let durations: Vec<Fraction> = rendered.events.iter().map(|e| e.duration).collect();
        assert_eq!(durations, vec![q(1, 2), q(3, 4)]);
    }

    #[test]
    fn test_steps_past_length_are_silent() {
        let rendered = render(&pattern(8, &[(0, note(48)), (10, off()), (12, note(60))]));
        assert_eq!(rendered.events.len(), 1);
        assert_eq!(rendered.events[0].duration, q(2, 1));
    }

    #[test]
    fn test_note_end_lookahead() {
        let track = pattern(8, &[(1, note(48)), (6, off())]).tracks()[0].clone();
        assert_eq!(note_end(&track, 1), 6);
        assert_eq!(note_end(&track, 6), 8);
        assert_eq!(note_end(&track, 7), 8);
    }

    #[test]
    fn test_end_to_end_single_note() {
        let pattern = pattern(8, &[(0, note(48)), (4, off())]);
        let timeline = sequence_pattern(&mut Synthesizer::seeded(0), &pattern, 120.0).unwrap();
        assert_eq!(
            timeline.rendered.events,
            vec![NoteEvent {
                instrument: 1,
                track: 0,
                key: 60,
                start: Fraction::ZERO,
                duration: q(1, 1),
            }]
        );
    }

    proptest! {
        #[test]
        fn prop_plain_note_key(value in 0u8..=115) {
            let rendered = render(&pattern(4, &[(0, note(value))]));
            prop_assert_eq!(keys(&rendered.events), vec![value + 12]);
        }
    }

    // ---- chords ----

    #[test]
    fn test_chord_fans_out() {
        let rendered = render(&pattern(16, &[(2, chord(48, CHORD_MAJOR)), (6, off())]));
        assert_eq!(keys(&rendered.events), vec![60, 64, 67]);
        for event in &rendered.events {
            assert_eq!(event.start, q(1, 2));
            assert_eq!(event.duration, q(1, 1));
        }
    }

    #[test]
    fn test_chord_in_second_slot() {
        let step = note(48).with_fx2(Effect::new(EffectKind::Chord, CHORD_MAJOR));
        let rendered = render(&pattern(4, &[(0, step)]));
        assert_eq!(keys(&rendered.events), vec![60, 64, 67]);
    }

    #[test]
    fn test_unknown_chord_is_skipped() {
        let rendered = render(&pattern(8, &[(0, chord(48, 200)), (4, note(50))]));
        assert_eq!(keys(&rendered.events), vec![62]);
        assert_eq!(rendered.skipped.len(), 1);
        assert_eq!(rendered.skipped[0].location.step, 0);
        assert_eq!(
            rendered.skipped[0].source,
            SynthError::Core(Error::UnknownChordCode(200))
        );
    }

    #[test]
    fn test_chord_above_range_is_skipped() {
        let rendered = render(&pattern(4, &[(0, chord(Note::MAX_PITCHED, CHORD_MAJOR))]));
        assert!(rendered.events.is_empty());
        assert!(matches!(
            rendered.skipped[0].source,
            SynthError::Core(Error::NoteOutOfRange { .. })
        ));
    }

    #[test]
    fn test_pitch_above_midi_range_is_skipped() {
        let rendered = render(&pattern(4, &[(0, note(120))]));
        assert!(rendered.events.is_empty());
        assert_eq!(
            rendered.skipped[0].source,
            SynthError::Core(Error::PitchOutOfRange(132))
        );
    }

    // ---- arpeggios ----

    #[test]
    fn test_arp_last_note_is_clipped() {
        // three-step notes over four steps: one full note, then a one-step tail
        let rendered = render(&pattern(16, &[(0, arp(48, CHORD_MAJOR, ARP_UP_3_STEPS)), (4, off())]));
        assert_eq!(keys(&rendered.events), vec![60, 64]);
        assert_eq!(rendered.events[0].duration, q(3, 4));
        assert_eq!(rendered.events[1].start, q(3, 4));
        assert_eq!(rendered.events[1].duration, q(1, 4));
        assert_eq!(rendered.events[1].end(), q(1, 1));
    }

    #[test]
    fn test_arp_thirds_of_a_step() {
        let rendered = render(&pattern(16, &[(0, arp(48, CHORD_MAJOR, ARP_UP_THIRD_STEP)), (1, off())]));
        assert_eq!(keys(&rendered.events), vec![60, 64, 67]);
        let starts: Vec<Fraction> = rendered.events.iter().map(|e| e.start).collect();
        assert_eq!(starts, vec![q(0, 1), q(1, 12), q(1, 6)]);
        assert_eq!(rendered.events[2].end(), q(1, 4));
    }

    #[test]
    fn test_arp_descending_wraps() {
        let rendered = render(&pattern(4, &[(0, arp(48, CHORD_MAJOR, ARP_DOWN_1_STEP))]));
        assert_eq!(keys(&rendered.events), vec![67, 64, 60, 67]);
        assert!(rendered.events.iter().all(|e| e.duration == q(1, 4)));
    }

    #[test]
    fn test_arp_random_is_seeded() {
        let pattern = pattern(16, &[(0, arp(48, CHORD_MAJOR, ARP_RANDOM_1_STEP))]);
        let first = render_seeded(&pattern, 42);
        let second = render_seeded(&pattern, 42);
        assert_eq!(first, second);
        assert_eq!(first.events.len(), 16);
        assert!(first.events.iter().all(|e| [60, 64, 67].contains(&e.key)));
    }

    #[test]
    fn test_arp_without_chord_plays_plain_note() {
        let step = note(48).with_fx2(Effect::new(EffectKind::Arpeggio, ARP_DOWN_1_STEP));
        let rendered = render(&pattern(4, &[(0, step)]));
        assert_eq!(keys(&rendered.events), vec![60]);
        assert_eq!(rendered.events[0].duration, q(1, 1));
    }

    #[test]
    fn test_cleared_arp_plays_chord() {
        let rendered = render(&pattern(4, &[(0, arp(48, CHORD_MAJOR, 0))]));
        assert_eq!(keys(&rendered.events), vec![60, 64, 67]);
        assert!(rendered.skipped.is_empty());
    }

    #[test]
    fn test_unknown_arp_is_skipped() {
        let rendered = render(&pattern(4, &[(0, arp(48, CHORD_MAJOR, 99))]));
        assert!(rendered.events.is_empty());
        assert_eq!(
            rendered.skipped[0].source,
            SynthError::Core(Error::UnknownArpCode(99))
        );
    }

    proptest! {
        #[test]
        fn prop_arp_stays_inside_note(
            chord_code in 1u8..=29,
            arp_code in 1u8..=33,
            off_at in 1usize..16,
            seed in any::<u64>(),
        ) {
            let pattern = pattern(16, &[(0, arp(40, chord_code, arp_code)), (off_at, off())]);
            let rendered = render_seeded(&pattern, seed);
            let end = Fraction::from(off_at) * q(1, 4);

            prop_assert!(rendered.skipped.is_empty());
            prop_assert!(!rendered.events.is_empty());
            for event in &rendered.events {
                prop_assert!(event.start < end);
                prop_assert!(event.end() <= end);
                prop_assert!(event.duration > Fraction::ZERO);
            }
            let last = rendered.events.iter().map(NoteEvent::end).max().unwrap();
            prop_assert_eq!(last, end);
        }
    }

    // ---- instruments and errors ----

    #[test]
    fn test_instrument_zero_is_skipped() {
        let rendered = render(&pattern(4, &[(0, Step::new(Note::new(48), 0))]));
        assert!(rendered.events.is_empty());
        assert_eq!(rendered.skipped[0].source, SynthError::UnmappedInstrument(0));
    }

    #[test]
    fn test_instruments_get_tracks_in_order() {
        let mut tracks = vec![Track::empty(4).unwrap(); Pattern::NUMBER_OF_TRACKS];
        tracks[0].set_step(0, Step::new(Note::new(48), 9)).unwrap();
        tracks[5].set_step(0, Step::new(Note::new(50), 2)).unwrap();
        let pattern = Pattern::new(tracks).unwrap();

        let rendered = render(&pattern);
        let tracks: Vec<(u8, usize)> = rendered.events.iter().map(|e| (e.instrument, e.track)).collect();
        assert_eq!(tracks, vec![(9, 1), (2, 0)]);
    }

    #[test]
    fn test_only_not_pitched_is_fatal() {
        assert!(SynthError::Core(Error::NotPitched(Note::OFF)).is_fatal());
        assert!(!SynthError::Core(Error::UnknownChordCode(3)).is_fatal());
        assert!(!SynthError::UnmappedInstrument(0).is_fatal());
        assert!(!SynthError::Core(Error::PitchOutOfRange(140)).is_fatal());
    }

    #[test]
    fn test_offset_shifts_events() {
        let pattern = pattern(8, &[(2, note(48))]);
        let instruments = InstrumentMap::for_pattern(&pattern);
        let rendered = Synthesizer::seeded(0)
            .render_pattern(&pattern, Some(3), &instruments, q(5, 1))
            .unwrap();
        assert_eq!(rendered.events[0].start, q(11, 2));
    }

    // ---- songs ----

    #[test]
    fn test_song_chain_places_patterns() {
        let mut patterns = BTreeMap::new();
        patterns.insert(1, pattern(4, &[(0, note(48))]));
        patterns.insert(2, pattern(4, &[(0, note(55)), (1, note(57))]));
        let song = Song::new(vec![1, 1, 2], patterns, 120.0).unwrap();

        let timeline = sequence_song(&mut Synthesizer::seeded(0), &song).unwrap();
        let second: Vec<&NoteEvent> = timeline
            .rendered
            .events
            .iter()
            .filter(|e| e.key == 67 || e.key == 69)
            .collect();
        assert_eq!(second.len(), 2);
        assert!(second.iter().all(|e| e.start >= q(2, 1)));
        assert_eq!(timeline.end(), q(3, 1));
    }

    #[test]
    fn test_song_skip_reports_pattern() {
        let mut patterns = BTreeMap::new();
        patterns.insert(4, pattern(4, &[(1, chord(48, 250))]));
        let song = Song::new(vec![4], patterns, 120.0).unwrap();

        let timeline = sequence_song(&mut Synthesizer::seeded(0), &song).unwrap();
        let skipped = &timeline.rendered.skipped[0];
        assert_eq!(skipped.location.pattern, Some(4));
        assert_eq!(skipped.to_string(), "pattern 4, track 1, step 1: unknown chord type code 250");
    }
}
