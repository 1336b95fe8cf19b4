//! Logging collaborator handed to every build
//!
//! Nothing here is global: the caller owns the logger and its verbosity, so
//! repeated builds in one process never share settings.

use std::cell::RefCell;

pub trait Logger {
    fn error(&self, message: &str);
    fn warning(&self, message: &str);
    fn notice(&self, message: &str);
    fn info(&self, message: &str);
}

/// Prints to the terminal. Warnings and errors go to stderr, the rest to
/// stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TerminalLogger {
    pub quiet: bool,
    pub verbose: bool,
}

impl TerminalLogger {
    pub fn new(quiet: bool, verbose: bool) -> Self {
        Self { quiet, verbose }
    }
}

impl Logger for TerminalLogger {
    fn error(&self, message: &str) {
        eprintln!("error: {}", message.trim_end());
    }

    fn warning(&self, message: &str) {
        eprintln!("warning: {}", message.trim_end());
    }

    fn notice(&self, message: &str) {
        if self.quiet {
            return;
        }
        println!("{}", message.trim_end());
    }

    fn info(&self, message: &str) {
        if self.quiet || !self.verbose {
            return;
        }
        println!(">> {}", message.trim_end());
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogMessages {
    pub error: Vec<String>,
    pub warning: Vec<String>,
    pub notice: Vec<String>,
    pub info: Vec<String>,
}

/// Keeps every message in memory, grouped by level.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    messages: RefCell<LogMessages>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> LogMessages {
        self.messages.borrow().clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.messages.borrow().warning.clone()
    }
}

impl Logger for MemoryLogger {
    fn error(&self, message: &str) {
        self.messages.borrow_mut().error.push(message.to_string());
    }

    fn warning(&self, message: &str) {
        self.messages.borrow_mut().warning.push(message.to_string());
    }

    fn notice(&self, message: &str) {
        self.messages.borrow_mut().notice.push(message.to_string());
    }

    fn info(&self, message: &str) {
        self.messages.borrow_mut().info.push(message.to_string());
    }
}
