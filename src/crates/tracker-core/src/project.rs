use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Error, Result};
use crate::pattern::Pattern;

/// A sequence of patterns played back to back
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Song {
    /// Pattern numbers in playback order, 1-based; numbers may repeat
    pattern_chain: Vec<u8>,
    /// Every distinct pattern the chain refers to
    patterns: BTreeMap<u8, Pattern>,
    /// Tempo in beats per minute
    bpm: f32,
}

impl Song {
    pub const MAXIMUM_SLOTS: usize = 255;

    pub fn new(pattern_chain: Vec<u8>, patterns: BTreeMap<u8, Pattern>, bpm: f32) -> Result<Song> {
        if pattern_chain.len() > Self::MAXIMUM_SLOTS {
            return Err(Error::SongTooLong {
                max: Self::MAXIMUM_SLOTS,
                actual: pattern_chain.len(),
            });
        }
        if let Some(&missing) = pattern_chain.iter().find(|&&n| !patterns.contains_key(&n)) {
            return Err(Error::MissingPattern(missing));
        }
        Ok(Song {
            pattern_chain,
            patterns,
            bpm,
        })
    }

    pub fn pattern_chain(&self) -> &[u8] {
        &self.pattern_chain
    }

    pub fn patterns(&self) -> &BTreeMap<u8, Pattern> {
        &self.patterns
    }

    pub fn pattern(&self, number: u8) -> Option<&Pattern> {
        self.patterns.get(&number)
    }

    pub fn bpm(&self) -> f32 {
        self.bpm
    }

    /// Chain entries resolved to their patterns, in playback order
    pub fn patterns_in_order(&self) -> impl Iterator<Item = (u8, &Pattern)> + '_ {
        self.pattern_chain
            .iter()
            .filter_map(|&number| self.patterns.get(&number).map(|pattern| (number, pattern)))
    }

    /// Instruments used by the distinct patterns of the song
    pub fn instruments(&self) -> BTreeSet<u8> {
        self.patterns.values().flat_map(Pattern::instruments).collect()
    }
}

/// A tracker project: the song plus the project's own metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Project {
    pub name: String,
    pub song: Song,
}

impl Project {
    /// Size of a `project.mt` file
    pub const PAYLOAD_LENGTH: usize = 0x624;

    const PATTERN_CHAIN_OFFSET: usize = 0x10;
    const PATTERN_CHAIN_END: usize = 0x10F;

    const BPM_OFFSET: usize = 0x1C0;
    const BPM_LENGTH: usize = 4;

    pub const DEFAULT_NAME: &'static str = "Untitled";

    /// Decode a project file together with the raw bytes of its pattern
    /// files, keyed by pattern number. Each pattern buffer is a whole
    /// `.mtp` file. Pattern numbers missing from `pattern_files` are simply
    /// absent from the song's mapping.
    pub fn from_bytes(data: &[u8], pattern_files: &BTreeMap<u8, Vec<u8>>) -> Result<Project> {
        if data.len() != Self::PAYLOAD_LENGTH {
            return Err(Error::malformed_length("project", Self::PAYLOAD_LENGTH, data.len()));
        }

        let patterns = pattern_files
            .iter()
            .map(|(&number, bytes)| Pattern::from_file_bytes(bytes).map(|pattern| (number, pattern)))
            .collect::<Result<BTreeMap<_, _>>>()?;

        let bpm = bpm_from_bytes(&data[Self::BPM_OFFSET..Self::BPM_OFFSET + Self::BPM_LENGTH])?;
        let pattern_chain =
            pattern_chain_from_bytes(&data[Self::PATTERN_CHAIN_OFFSET..Self::PATTERN_CHAIN_END]);

        Ok(Project {
            name: Self::DEFAULT_NAME.to_string(),
            song: Song::new(pattern_chain, patterns, bpm)?,
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// Pattern numbers up to the first unused (zero) slot
pub fn pattern_chain_from_bytes(data: &[u8]) -> Vec<u8> {
    data.iter().copied().take_while(|&number| number != 0).collect()
}

/// Tempo is a little-endian 32-bit float, rounded to one decimal place
pub fn bpm_from_bytes(data: &[u8]) -> Result<f32> {
    let bytes: [u8; 4] = data
        .try_into()
        .map_err(|_| Error::malformed_length("tempo", 4, data.len()))?;
    let raw = f32::from_le_bytes(bytes);
    Ok((raw * 10.0).round() / 10.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::Track;

    fn empty_pattern(length: usize) -> Pattern {
        Pattern::new(vec![Track::empty(length).unwrap(); Pattern::NUMBER_OF_TRACKS]).unwrap()
    }

    fn pattern_file(length: usize) -> Vec<u8> {
        let mut file = vec![0u8; Pattern::OFFSET_START];
        file.extend(empty_pattern(length).to_bytes());
        file
    }

    fn project_bytes(chain: &[u8], bpm: f32) -> Vec<u8> {
        let mut data = vec![0u8; Project::PAYLOAD_LENGTH];
        data[0x10..0x10 + chain.len()].copy_from_slice(chain);
        data[0x1C0..0x1C4].copy_from_slice(&bpm.to_le_bytes());
        data
    }

    #[test]
    fn test_chain_stops_at_first_zero() {
        assert_eq!(pattern_chain_from_bytes(&[1, 2, 2, 0, 5, 6]), vec![1, 2, 2]);
        assert_eq!(pattern_chain_from_bytes(&[0, 3]), Vec::<u8>::new());
    }

    #[test]
    fn test_bpm_rounding() {
        assert_eq!(bpm_from_bytes(&120.04f32.to_le_bytes()).unwrap(), 120.0);
        assert_eq!(bpm_from_bytes(&97.36f32.to_le_bytes()).unwrap(), 97.4);
        assert!(bpm_from_bytes(&[0, 0, 0]).is_err());
    }

    #[test]
    fn test_decode_project() {
        let mut files = BTreeMap::new();
        files.insert(1, pattern_file(16));
        files.insert(2, pattern_file(8));
        files.insert(9, pattern_file(8));

        let project = Project::from_bytes(&project_bytes(&[1, 1, 2], 133.3), &files).unwrap();
        assert_eq!(project.song.pattern_chain(), &[1, 1, 2]);
        assert_eq!(project.song.bpm(), 133.3);
        assert_eq!(project.song.patterns().len(), 3);
        assert_eq!(project.song.pattern(2).unwrap().length(), 8);
        assert_eq!(project.name, Project::DEFAULT_NAME);
    }

    #[test]
    fn test_chain_referencing_missing_pattern() {
        let mut files = BTreeMap::new();
        files.insert(1, pattern_file(16));
        assert_eq!(
            Project::from_bytes(&project_bytes(&[1, 4], 120.0), &files),
            Err(Error::MissingPattern(4))
        );
    }

    #[test]
    fn test_wrong_project_length() {
        assert_eq!(
            Project::from_bytes(&[0u8; 10], &BTreeMap::new()),
            Err(Error::malformed_length("project", 0x624, 10))
        );
    }

    #[test]
    fn test_song_too_long() {
        let mut patterns = BTreeMap::new();
        patterns.insert(1, empty_pattern(16));
        assert!(matches!(
            Song::new(vec![1; 256], patterns, 120.0),
            Err(Error::SongTooLong { max: 255, actual: 256 })
        ));
    }

    #[test]
    fn test_patterns_in_order_repeats() {
        let mut patterns = BTreeMap::new();
        patterns.insert(1, empty_pattern(16));
        patterns.insert(2, empty_pattern(8));
        let song = Song::new(vec![2, 1, 2], patterns, 120.0).unwrap();
        let order: Vec<u8> = song.patterns_in_order().map(|(n, _)| n).collect();
        assert_eq!(order, vec![2, 1, 2]);
    }
}
