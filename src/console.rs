use chrono::{DateTime, Local};
use std::collections::VecDeque;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARN",
            Severity::Error => "ERROR",
        })
    }
}

#[derive(Clone, Debug)]
pub struct ConsoleEntry {
    pub timestamp: DateTime<Local>,
    pub severity: Severity,
    pub text: String,
}

/// Bounded log shown in the console region; oldest lines fall off first.
#[derive(Clone, Debug)]
pub struct Console {
    entries: VecDeque<ConsoleEntry>,
    capacity: usize,
}

impl Console {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(1024)),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, severity: Severity, text: impl Into<String>) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(ConsoleEntry {
            timestamp: Local::now(),
            severity,
            text: text.into(),
        });
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.push(Severity::Info, text);
    }

    pub fn warn(&mut self, text: impl Into<String>) {
        self.push(Severity::Warning, text);
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.push(Severity::Error, text);
    }

    pub fn entries(&self) -> impl DoubleEndedIterator<Item = &ConsoleEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_oldest_when_full() {
        let mut console = Console::new(2);
        console.info("one");
        console.warn("two");
        console.error("three");
        let texts: Vec<_> = console.entries().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["two", "three"]);
        assert_eq!(console.entries().last().map(|e| e.severity), Some(Severity::Error));
    }

    #[test]
    fn severity_honours_width() {
        assert_eq!(format!("[{:5}]", Severity::Info), "[INFO ]");
        assert_eq!(format!("[{:5}]", Severity::Error), "[ERROR]");
    }
}
