use serde::Serialize;
use tracker_core::{Pattern, Step};

/// Renders a pattern the way the tracker's pattern screen lays it out
pub struct TextFormatter {
    column_gap: usize,
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self::new(2)
    }
}

impl TextFormatter {
    pub fn new(column_gap: usize) -> Self {
        Self { column_gap }
    }

    /// One row per step up to the pattern length, one column per track
    pub fn build_table(&self, pattern: &Pattern) -> String {
        let gap = " ".repeat(self.column_gap);
        let rows = pattern.length();

        let columns: Vec<Vec<String>> = pattern
            .tracks()
            .iter()
            .map(|track| {
                (0..rows)
                    .map(|i| track.step(i).map(format_cell).unwrap_or_default())
                    .collect()
            })
            .collect();

        let widths: Vec<usize> = columns
            .iter()
            .enumerate()
            .map(|(i, cells)| {
                cells
                    .iter()
                    .map(String::len)
                    .chain(std::iter::once(track_header(i).len()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut output = String::new();
        let header: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(i, &width)| format!("{:<width$}", track_header(i), width = width))
            .collect();
        output.push_str(&format!("{:>3}{}{}", "", gap, header.join(&gap)).trim_end().to_string());
        output.push('\n');

        for row in 0..rows {
            let cells: Vec<String> = columns
                .iter()
                .zip(&widths)
                .map(|(cells, &width)| format!("{:<width$}", cells[row], width = width))
                .collect();
            let line = format!("{:>3}{}{}", row, gap, cells.join(&gap));
            output.push_str(line.trim_end());
            output.push('\n');
        }

        output
    }

    pub fn build_json(&self, pattern: &Pattern) -> serde_json::Result<String> {
        #[derive(Serialize)]
        struct JsonOutput<'a> {
            length: usize,
            instruments: Vec<u8>,
            pattern: &'a Pattern,
        }

        serde_json::to_string_pretty(&JsonOutput {
            length: pattern.length(),
            instruments: pattern.instruments().into_iter().collect(),
            pattern,
        })
    }
}

fn track_header(index: usize) -> String {
    format!("Track {}", index + 1)
}

/// `C4  01 C05 ---`: note, instrument, then both effect slots
fn format_cell(step: &Step) -> String {
    let instrument = if step.is_empty() && step.instrument == 0 {
        "--".to_string()
    } else {
        format!("{:02}", step.instrument)
    };
    format!("{:<3} {} {} {}", step.note.to_string(), instrument, step.fx1, step.fx2)
}
