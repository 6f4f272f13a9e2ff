//! Line emitter for native output
//!
//! Conditions are queued rather than written immediately: whether a
//! condition line carries `AND`, `OR` or no conjunction at all is only
//! known once the next operand of the expression has been seen.

use hrw4u_core::CondState;
use tracing::trace;

/// A condition waiting for its conjunction
#[derive(Debug, Clone)]
pub struct Queued {
    pub text: String,
    pub state: CondState,
    pub indent: usize,
}

/// Output buffer with condition queueing and indentation
#[derive(Debug, Clone)]
pub struct Emitter {
    lines: Vec<String>,
    queued: Option<Queued>,
    unit: String,
    pub cond_indent: usize,
    pub stmt_indent: usize,
}

impl Emitter {
    pub fn new(indent: usize) -> Self {
        Self {
            lines: Vec::new(),
            queued: None,
            unit: " ".repeat(indent),
            cond_indent: 0,
            stmt_indent: 0,
        }
    }

    fn indented(&self, text: &str, level: usize) -> String {
        format!("{}{}", self.unit.repeat(level), text)
    }

    /// Write a line at the condition indent, bypassing the queue
    pub fn line(&mut self, text: &str) {
        let line = self.indented(text, self.cond_indent);
        self.lines.push(line);
    }

    /// Queue a condition, writing out any previously queued one
    pub fn queue(&mut self, text: String, state: CondState) {
        self.flush();
        trace!("queue cond: {} state={:?}", text, state.to_list());
        self.queued = Some(Queued {
            text,
            state,
            indent: self.cond_indent,
        });
    }

    pub fn queued_mut(&mut self) -> Option<&mut Queued> {
        self.queued.as_mut()
    }

    pub fn flush(&mut self) {
        if let Some(q) = self.queued.take() {
            let line = self.indented(&format!("{}{}", q.text, q.state.render()), q.indent);
            trace!("flush cond: {}", line);
            self.lines.push(line);
        }
    }

    /// Write an operator line at the statement indent
    pub fn statement(&mut self, text: &str) {
        self.flush();
        let line = self.indented(text, self.stmt_indent);
        self.lines.push(line);
    }

    pub fn blank(&mut self) {
        self.flush();
        self.lines.push(String::new());
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.queued.is_none()
    }

    /// Position to roll back to
    pub fn mark(&mut self) -> usize {
        self.flush();
        self.lines.len()
    }

    /// Drop everything written or queued since `mark`
    pub fn rollback(&mut self, mark: usize) {
        self.queued = None;
        self.lines.truncate(mark);
    }

    pub fn finish(mut self) -> Vec<String> {
        self.flush();
        self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_defers_conjunction() {
        let mut emitter = Emitter::new(4);
        emitter.queue("cond %{A}".to_string(), CondState::new());
        if let Some(q) = emitter.queued_mut() {
            q.state.or = true;
        }
        emitter.queue(
            "cond %{B}".to_string(),
            CondState {
                last: true,
                ..CondState::new()
            },
        );
        emitter.statement("no-op");
        assert_eq!(emitter.finish(), vec!["cond %{A} [OR]", "cond %{B}", "no-op"]);
    }

    #[test]
    fn test_indentation() {
        let mut emitter = Emitter::new(2);
        emitter.cond_indent = 1;
        emitter.stmt_indent = 2;
        emitter.line("elif");
        emitter.statement("set-debug");
        assert_eq!(emitter.finish(), vec!["  elif", "    set-debug"]);
    }

    #[test]
    fn test_rollback() {
        let mut emitter = Emitter::new(4);
        emitter.line("keep");
        let mark = emitter.mark();
        emitter.line("drop");
        emitter.queue("cond %{X}".to_string(), CondState::new());
        emitter.rollback(mark);
        assert_eq!(emitter.finish(), vec!["keep"]);
    }
}
