//! Output sinks
//!
//! Generated code is appended to a [`Sink`]. The generator keeps a
//! [`SinkStack`] whose bottom entry is the global output buffer; pushing a
//! sink redirects all writes until it is popped again.

use bytes::{BufMut, BytesMut};
use std::fmt;

const INDENT: &str = "  ";

/// Append-only text buffer with a read cursor
#[derive(Debug, Default, Clone)]
pub struct Sink {
    buf: BytesMut,
    read: usize,
}

impl Sink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append text
    pub fn write(&mut self, text: &str) {
        self.buf.put_slice(text.as_bytes());
    }

    /// Append one line at the given indentation depth
    pub fn line(&mut self, depth: usize, text: &str) {
        for _ in 0..depth {
            self.write(INDENT);
        }
        self.write(text);
        self.buf.put_u8(b'\n');
    }

    /// Append text that may span several lines, indenting each line
    pub fn block(&mut self, depth: usize, text: &str) {
        for line in text.lines() {
            if line.is_empty() {
                self.buf.put_u8(b'\n');
            } else {
                self.line(depth, line);
            }
        }
    }

    /// Everything written so far
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.buf).unwrap_or_default()
    }

    /// Text written since the last read, advancing the cursor
    pub fn read_new(&mut self) -> String {
        let text = std::str::from_utf8(&self.buf[self.read..])
            .unwrap_or_default()
            .to_string();
        self.read = self.buf.len();
        text
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Discard all contents
    pub fn clear(&mut self) {
        self.buf.clear();
        self.read = 0;
    }

    /// Consume the sink, returning its text
    pub fn into_string(self) -> String {
        String::from_utf8(self.buf.to_vec()).unwrap_or_default()
    }
}

impl fmt::Write for Sink {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write(s);
        Ok(())
    }
}

impl fmt::Display for Sink {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stack of sinks; writes go to the top
#[derive(Debug, Default)]
pub struct SinkStack {
    global: Sink,
    redirects: Vec<Sink>,
}

impl SinkStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink currently receiving output
    pub fn current(&mut self) -> &mut Sink {
        match self.redirects.last_mut() {
            Some(sink) => sink,
            None => &mut self.global,
        }
    }

    /// Redirect output into `sink`
    pub fn push(&mut self, sink: Sink) {
        self.redirects.push(sink);
    }

    /// Stop the innermost redirect, returning what it captured
    ///
    /// The global sink is never popped.
    pub fn pop(&mut self) -> Option<Sink> {
        self.redirects.pop()
    }

    /// Number of active redirects
    pub fn depth(&self) -> usize {
        self.redirects.len()
    }

    pub fn global(&self) -> &Sink {
        &self.global
    }

    pub fn global_mut(&mut self) -> &mut Sink {
        &mut self.global
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt::Write;

    #[test]
    fn test_write_and_read() {
        let mut sink = Sink::new();
        sink.write("abc");
        write!(sink, "{}", 42).unwrap();
        assert_eq!(sink.as_str(), "abc42");
        assert_eq!(sink.len(), 5);
    }

    #[test]
    fn test_read_cursor() {
        let mut sink = Sink::new();
        sink.write("one");
        assert_eq!(sink.read_new(), "one");
        sink.write("two");
        assert_eq!(sink.read_new(), "two");
        assert_eq!(sink.read_new(), "");
        assert_eq!(sink.as_str(), "onetwo");
    }

    #[test]
    fn test_indented_lines() {
        let mut sink = Sink::new();
        sink.line(0, "a {");
        sink.block(1, "b;\nc;");
        sink.line(0, "}");
        assert_eq!(sink.as_str(), "a {\n  b;\n  c;\n}\n");
    }

    #[test]
    fn test_clear() {
        let mut sink = Sink::new();
        sink.write("abc");
        sink.clear();
        assert!(sink.is_empty());
        assert_eq!(sink.read_new(), "");
    }

    #[test]
    fn test_stack_redirect() {
        let mut stack = SinkStack::new();
        stack.current().write("global ");
        stack.push(Sink::new());
        stack.current().write("captured");
        assert_eq!(stack.depth(), 1);

        let captured = stack.pop().unwrap();
        assert_eq!(captured.as_str(), "captured");

        stack.current().write("again");
        assert_eq!(stack.global().as_str(), "global again");
        assert!(stack.pop().is_none());
    }
}
