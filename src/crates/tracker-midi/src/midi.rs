use midly::{Format, Header, MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind};
use tracing::debug;
use tracker_core::Fraction;

use crate::options::ExportOptions;
use crate::song::{track_name, Timeline};

#[derive(Debug, thiserror::Error)]
pub enum MidiError {
    #[error("output track {track} does not exist, file has {count} tracks")]
    NoSuchTrack { track: usize, count: usize },

    #[error("{what} {value} is outside the MIDI range 0..={max}")]
    OutOfRange {
        what: &'static str,
        value: u32,
        max: u32,
    },

    #[error("resolution must be 1..=32767 ticks per quarter note, got {0}")]
    InvalidResolution(u16),

    #[error("invalid tempo {0} BPM")]
    InvalidTempo(f32),

    #[error("failed to write MIDI: {0}")]
    Io(#[from] std::io::Error),
}

fn check_range(what: &'static str, value: u32, max: u32) -> Result<(), MidiError> {
    if value > max {
        return Err(MidiError::OutOfRange { what, value, max });
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Message {
    Tempo { us_per_quarter: u32 },
    NoteOff { channel: u8, key: u8 },
    NoteOn { channel: u8, key: u8, velocity: u8 },
}

impl Message {
    /// At equal ticks tempo goes first and note-offs precede note-ons, so a
    /// note retriggered right where the previous one ends is not cut short
    fn rank(&self) -> u8 {
        match self {
            Message::Tempo { .. } => 0,
            Message::NoteOff { .. } => 1,
            Message::NoteOn { .. } => 2,
        }
    }

    fn kind(&self) -> TrackEventKind<'static> {
        match *self {
            Message::Tempo { us_per_quarter } => {
                TrackEventKind::Meta(MetaMessage::Tempo(us_per_quarter.into()))
            }
            Message::NoteOff { channel, key } => TrackEventKind::Midi {
                channel: channel.into(),
                message: MidiMessage::NoteOff {
                    key: key.into(),
                    vel: 0u8.into(),
                },
            },
            Message::NoteOn {
                channel,
                key,
                velocity,
            } => TrackEventKind::Midi {
                channel: channel.into(),
                message: MidiMessage::NoteOn {
                    key: key.into(),
                    vel: velocity.into(),
                },
            },
        }
    }
}

#[derive(Debug, Clone, Default)]
struct PendingTrack {
    name: Option<String>,
    events: Vec<(u32, Message)>,
}

/// In-memory Standard MIDI File built from quarter-note times
#[derive(Debug, Clone)]
pub struct MidiFile {
    ppq: u16,
    tracks: Vec<PendingTrack>,
}

impl MidiFile {
    pub fn new(track_count: usize, ppq: u16) -> Self {
        MidiFile {
            ppq,
            tracks: vec![PendingTrack::default(); track_count.max(1)],
        }
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    fn track_mut(&mut self, track: usize) -> Result<&mut PendingTrack, MidiError> {
        let count = self.tracks.len();
        self.tracks
            .get_mut(track)
            .ok_or(MidiError::NoSuchTrack { track, count })
    }

    pub fn add_tempo(&mut self, track: usize, time: Fraction, bpm: f32) -> Result<(), MidiError> {
        if !(bpm.is_finite() && bpm > 0.0) {
            return Err(MidiError::InvalidTempo(bpm));
        }
        let us_per_quarter = (60_000_000.0 / bpm as f64).round() as u32;
        if us_per_quarter == 0 || us_per_quarter > 0xFF_FFFF {
            return Err(MidiError::InvalidTempo(bpm));
        }
        let tick = time.to_ticks(self.ppq);
        self.track_mut(track)?
            .events
            .push((tick, Message::Tempo { us_per_quarter }));
        Ok(())
    }

    pub fn add_track_name(&mut self, track: usize, name: impl Into<String>) -> Result<(), MidiError> {
        self.track_mut(track)?.name = Some(name.into());
        Ok(())
    }

    pub fn add_note(
        &mut self,
        track: usize,
        channel: u8,
        key: u8,
        start: Fraction,
        duration: Fraction,
        velocity: u8,
    ) -> Result<(), MidiError> {
        check_range("channel", channel as u32, 15)?;
        check_range("key", key as u32, 127)?;
        check_range("velocity", velocity as u32, 127)?;

        let on = start.to_ticks(self.ppq);
        // notes shorter than half a tick would round to zero length
        let off = (start + duration).to_ticks(self.ppq).max(on + 1);
        let events = &mut self.track_mut(track)?.events;
        events.push((
            on,
            Message::NoteOn {
                channel,
                key,
                velocity,
            },
        ));
        events.push((off, Message::NoteOff { channel, key }));
        Ok(())
    }

    /// Serialize as a format 1 (parallel tracks) file
    pub fn to_bytes(&self) -> Result<Vec<u8>, MidiError> {
        if !(1..=0x7FFF).contains(&self.ppq) {
            return Err(MidiError::InvalidResolution(self.ppq));
        }
        let header = Header::new(Format::Parallel, Timing::Metrical(self.ppq.into()));

        let mut tracks = Vec::with_capacity(self.tracks.len());
        for pending in &self.tracks {
            let mut track = Vec::with_capacity(pending.events.len() + 2);

            if let Some(name) = &pending.name {
                track.push(TrackEvent {
                    delta: 0u32.into(),
                    kind: TrackEventKind::Meta(MetaMessage::TrackName(name.as_bytes())),
                });
            }

            let mut events = pending.events.clone();
            events.sort_by_key(|(tick, message)| (*tick, message.rank()));

            let mut last_tick = 0;
            for (tick, message) in events {
                let delta = tick - last_tick;
                check_range("delta time", delta, 0x0FFF_FFFF)?;
                track.push(TrackEvent {
                    delta: delta.into(),
                    kind: message.kind(),
                });
                last_tick = tick;
            }

            track.push(TrackEvent {
                delta: 0u32.into(),
                kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
            });
            tracks.push(track);
        }

        let smf = Smf { header, tracks };
        let mut bytes = Vec::new();
        smf.write_std(&mut bytes)?;
        Ok(bytes)
    }
}

/// Lay a rendered timeline out as a MIDI file: one track per instrument,
/// the tempo on the first track
pub fn timeline_to_midi(timeline: &Timeline, options: &ExportOptions) -> Result<MidiFile, MidiError> {
    let mut midi = MidiFile::new(timeline.instruments.len(), options.ppq);
    midi.add_tempo(0, Fraction::ZERO, timeline.bpm)?;

    if options.track_names {
        for (instrument, track) in timeline.instruments.iter() {
            midi.add_track_name(track, track_name(instrument))?;
        }
    }

    for event in &timeline.rendered.events {
        midi.add_note(
            event.track,
            options.channel,
            event.key,
            event.start,
            event.duration,
            options.velocity,
        )?;
    }

    debug!(
        tracks = midi.track_count(),
        notes = timeline.rendered.events.len(),
        "built MIDI file"
    );
    Ok(midi)
}
