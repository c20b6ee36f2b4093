mod launch;
mod script;

use crate::{TraceLevel, TraceOrigin, TraceSink};

use std::fmt;
use std::sync::Mutex;

/// Sink that keeps every trace line for later assertions
#[derive(Default)]
pub(crate) struct RecordingSink {
    lines: Mutex<Vec<(TraceLevel, TraceOrigin, String)>>,
}

impl RecordingSink {
    pub(crate) fn child_lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, origin, _)| *origin == TraceOrigin::Child)
            .map(|(_, _, line)| line.clone())
            .collect()
    }
}

impl TraceSink for RecordingSink {
    fn emit(&self, level: TraceLevel, origin: TraceOrigin, message: fmt::Arguments<'_>) {
        self.lines
            .lock()
            .unwrap()
            .push((level, origin, message.to_string()));
    }
}
