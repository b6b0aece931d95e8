use crate::detect::{Detection, Detector};
use crate::page::PageEvent;
use std::collections::VecDeque;
use std::io::BufRead;
use thiserror::Error;
use tracing::{Level, event};

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("failed to read page feed at line {line}: {source}")]
    Io {
        line: usize,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed page event at line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

impl StreamError {
    pub fn line(&self) -> usize {
        match self {
            StreamError::Io { line, .. } | StreamError::Parse { line, .. } => *line,
        }
    }
}

/// Lazily reads page events, one JSON object per line, and yields the
/// detections they produce.
///
/// Malformed lines surface as an error item and reading carries on with the
/// next line. The stream ends at end of input and cannot be rewound.
pub struct DetectionStream<R> {
    reader: R,
    detector: Detector,
    pending: VecDeque<Detection>,
    line: usize,
    exhausted: bool,
}

impl<R: BufRead> DetectionStream<R> {
    pub fn new(reader: R) -> Self {
        Self::with_detector(reader, Detector::new())
    }

    pub fn with_detector(reader: R, detector: Detector) -> Self {
        Self {
            reader,
            detector,
            pending: VecDeque::new(),
            line: 0,
            exhausted: false,
        }
    }

    pub fn detector(&self) -> &Detector {
        &self.detector
    }

    pub fn detector_mut(&mut self) -> &mut Detector {
        &mut self.detector
    }

    pub fn lines_read(&self) -> usize {
        self.line
    }

    fn read_event(&mut self) -> Option<Result<PageEvent, StreamError>> {
        let mut buffer = String::new();
        loop {
            buffer.clear();
            match self.reader.read_line(&mut buffer) {
                Ok(0) => return None,
                Ok(_) => {
                    self.line += 1;
                    let trimmed = buffer.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    let line = self.line;
                    return Some(
                        PageEvent::from_json(trimmed)
                            .map_err(|source| StreamError::Parse { line, source }),
                    );
                }
                Err(source) => {
                    self.line += 1;
                    return Some(Err(StreamError::Io {
                        line: self.line,
                        source,
                    }));
                }
            }
        }
    }
}

impl<R: BufRead> Iterator for DetectionStream<R> {
    type Item = Result<Detection, StreamError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(detection) = self.pending.pop_front() {
                return Some(Ok(detection));
            }
            if self.exhausted {
                return None;
            }
            match self.read_event() {
                None => {
                    self.exhausted = true;
                    return None;
                }
                Some(Ok(page_event)) => {
                    self.pending.extend(self.detector.process(&page_event));
                }
                Some(Err(err)) => {
                    event!(
                        target: "thorp::detect",
                        Level::WARN,
                        line = err.line(),
                        error = %err,
                        "skipping page feed line"
                    );
                    if matches!(err, StreamError::Io { .. }) {
                        self.exhausted = true;
                    }
                    return Some(Err(err));
                }
            }
        }
    }
}
