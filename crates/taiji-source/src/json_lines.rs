//! JSON lines feed
//!
//! One `LandmarkFrame` per line, as written by an external detector process:
//!
//! ```text
//! {"timestamp":0,"points":[{"x":0.5,"y":0.2,"visibility":0.9},null,...]}
//! ```
//!
//! Blank lines are ignored. Lines that fail to parse are logged and skipped;
//! one bad frame should not end the session.
//!
//! `next_frame` reads the underlying reader directly and blocks while it
//! waits for a line. Pipes and stdin should go through `spawn`, which moves
//! the reader onto its own thread behind a `ChannelSource`.

use std::io::BufRead;
use std::thread;

use taiji_core::{LandmarkFrame, TaijiResult};
use tracing::{debug, warn};

use crate::{ChannelSource, FrameSource, SourcePoll};

pub struct JsonLinesSource<R> {
    reader: R,
    buf: String,
    line_no: u64,
    skipped: u64,
    closed: bool,
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: String::new(),
            line_no: 0,
            skipped: 0,
            closed: false,
        }
    }

    /// Lines rejected as malformed
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    pub fn line_no(&self) -> u64 {
        self.line_no
    }
}

impl<R: BufRead + Send + 'static> JsonLinesSource<R> {
    /// Read on a dedicated thread, buffering up to `capacity` parsed frames.
    ///
    /// The thread exits at end of input, or once the returned source has
    /// been dropped and the next frame cannot be delivered.
    pub fn spawn(mut self, capacity: usize) -> TaijiResult<ChannelSource> {
        let (tx, source) = ChannelSource::new(capacity);
        thread::Builder::new()
            .name("json-lines-feed".to_string())
            .spawn(move || {
                while let SourcePoll::Frame(frame) = self.next_frame() {
                    if tx.blocking_send(frame).is_err() {
                        debug!(line = self.line_no, "json feed receiver dropped");
                        break;
                    }
                }
            })?;
        Ok(source)
    }
}

impl<R: BufRead> FrameSource for JsonLinesSource<R> {
    fn next_frame(&mut self) -> SourcePoll {
        if self.closed {
            return SourcePoll::Closed;
        }

        loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => {
                    debug!(lines = self.line_no, skipped = self.skipped, "json feed exhausted");
                    self.closed = true;
                    return SourcePoll::Closed;
                }
                Ok(_) => {
                    self.line_no += 1;
                    let line = self.buf.trim();
                    if line.is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<LandmarkFrame>(line) {
                        Ok(frame) => return SourcePoll::Frame(frame),
                        Err(e) => {
                            self.skipped += 1;
                            warn!(line = self.line_no, error = %e, "skipping malformed frame");
                        }
                    }
                }
                Err(e) => {
                    warn!(line = self.line_no, error = %e, "json feed read failed");
                    self.closed = true;
                    return SourcePoll::Closed;
                }
            }
        }
    }

    fn describe(&self) -> &str {
        "json-lines"
    }
}
