use std::mem;

/// Append-only store of rendered failure messages.
///
/// The harness owns one per run and threads it through every node. Messages
/// keep their color tags, they are rendered when the conclusion is printed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FailureLog {
    messages: Vec<String>,
}

impl FailureLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    pub fn get(&self) -> &[String] {
        &self.messages
    }

    /// Take every message in the order they were logged, leaving the log empty.
    pub fn drain(&mut self) -> Vec<String> {
        mem::take(&mut self.messages)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
