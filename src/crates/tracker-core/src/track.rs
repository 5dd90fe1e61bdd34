use serde::Serialize;
use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::step::Step;

/// One monophonic voice of a pattern
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Track {
    length: usize,
    steps: Vec<Step>,
}

impl Track {
    /// Number of step slots stored for every track
    pub const NUMBER_OF_STEPS: usize = 128;
    pub const PAYLOAD_LENGTH: usize = 1 + Self::NUMBER_OF_STEPS * Step::PAYLOAD_LENGTH;

    pub fn new(length: usize, steps: Vec<Step>) -> Result<Track> {
        if steps.len() != Self::NUMBER_OF_STEPS {
            return Err(Error::InvalidCount {
                entity: "track steps",
                expected: Self::NUMBER_OF_STEPS,
                actual: steps.len(),
            });
        }
        if !(1..=Self::NUMBER_OF_STEPS).contains(&length) {
            return Err(Error::InvalidTrackLength(length));
        }
        Ok(Track { length, steps })
    }

    /// Track of the given length with every step empty
    pub fn empty(length: usize) -> Result<Track> {
        Track::new(length, vec![Step::EMPTY; Self::NUMBER_OF_STEPS])
    }

    pub fn from_bytes(data: &[u8]) -> Result<Track> {
        if data.len() != Self::PAYLOAD_LENGTH {
            return Err(Error::malformed_length("track", Self::PAYLOAD_LENGTH, data.len()));
        }

        // stored zero-based, the shortest track is one step long
        let length = data[0] as usize + 1;

        let steps = data[1..]
            .chunks_exact(Step::PAYLOAD_LENGTH)
            .map(Step::from_bytes)
            .collect::<Result<Vec<_>>>()?;

        Track::new(length, steps)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(Self::PAYLOAD_LENGTH);
        data.push((self.length - 1) as u8);
        for step in &self.steps {
            data.extend_from_slice(&step.to_bytes());
        }
        data
    }

    /// Number of leading steps that are played
    pub fn length(&self) -> usize {
        self.length
    }

    /// All 128 stored steps, including the ones past `length`
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn live_steps(&self) -> &[Step] {
        &self.steps[..self.length]
    }

    pub fn step(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    /// Replace one step slot; used when building tracks by hand
    pub fn set_step(&mut self, index: usize, step: Step) -> Result<()> {
        match self.steps.get_mut(index) {
            Some(slot) => {
                *slot = step;
                Ok(())
            }
            None => Err(Error::StepIndexOutOfRange {
                index,
                last: Self::NUMBER_OF_STEPS - 1,
            }),
        }
    }

    /// Instruments referenced by played steps
    pub fn instruments(&self) -> BTreeSet<u8> {
        self.live_steps()
            .iter()
            .filter(|step| step.instrument != 0)
            .map(|step| step.instrument)
            .collect()
    }
}
