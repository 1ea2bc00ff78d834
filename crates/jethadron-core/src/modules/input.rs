//! Configuration loading and JSON Lines event decoding.

use crate::common::AnalysisConfig;
use crate::domain::{AnalysisError, AnalysisResult, EventRecord};
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Parses and validates a JSON configuration document.
pub fn parse_config(source: &str) -> AnalysisResult<AnalysisConfig> {
    let config: AnalysisConfig = serde_json::from_str(source).map_err(|error| {
        AnalysisError::input_validation(
            "INPUT.CONFIG_PARSE",
            format!("invalid configuration JSON: {}", error),
        )
    })?;
    config.validate()?;
    Ok(config)
}

pub fn load_config(path: &Path) -> AnalysisResult<AnalysisConfig> {
    let source = fs::read_to_string(path).map_err(|error| {
        AnalysisError::io_system(
            "IO.CONFIG_READ",
            format!("failed to read configuration '{}': {}", path.display(), error),
        )
    })?;
    parse_config(&source)
}

/// Decodes one tagged event record per non-blank line.
pub struct EventStreamReader<R> {
    lines: std::io::Lines<R>,
    line_number: usize,
}

impl<R: BufRead> EventStreamReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_number: 0,
        }
    }

    /// Number of physical lines consumed so far.
    pub const fn line_number(&self) -> usize {
        self.line_number
    }
}

impl EventStreamReader<BufReader<File>> {
    pub fn open(path: &Path) -> AnalysisResult<Self> {
        let file = File::open(path).map_err(|error| {
            AnalysisError::io_system(
                "IO.EVENTS_OPEN",
                format!("failed to open event stream '{}': {}", path.display(), error),
            )
        })?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> Iterator for EventStreamReader<R> {
    type Item = AnalysisResult<EventRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = self.lines.next()?;
            self.line_number += 1;
            let line = match line {
                Ok(line) => line,
                Err(error) if error.kind() == io::ErrorKind::InvalidData => {
                    return Some(Err(AnalysisError::input_validation(
                        "INPUT.EVENT_RECORD",
                        format!("line {}: {}", self.line_number, error),
                    )));
                }
                Err(error) => {
                    return Some(Err(AnalysisError::io_system(
                        "IO.EVENTS_READ",
                        format!("failed to read line {}: {}", self.line_number, error),
                    )));
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            return Some(serde_json::from_str(&line).map_err(|error| {
                AnalysisError::input_validation(
                    "INPUT.EVENT_RECORD",
                    format!("line {}: {}", self.line_number, error),
                )
            }));
        }
    }
}
