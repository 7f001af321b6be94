/// Longest line kept before the buffer is flushed without a terminator
pub const MAX_LINE_LENGTH: usize = 1024;

/// Accumulates raw serial bytes and splits them into text lines.
///
/// Invalid UTF-8 sequences are dropped rather than failing the line.
#[derive(Debug, Default)]
pub struct LineBuffer {
    bytes: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, chunk: &[u8]) {
        self.bytes.extend_from_slice(chunk);
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    /// Takes the next complete line, terminator included
    pub fn next_line(&mut self) -> Option<String> {
        let end = match self.bytes.iter().position(|&b| b == b'\n') {
            Some(pos) => pos + 1,
            None if self.bytes.len() >= MAX_LINE_LENGTH => MAX_LINE_LENGTH,
            None => return None,
        };
        let raw: Vec<u8> = self.bytes.drain(..end).collect();
        Some(
            String::from_utf8_lossy(&raw)
                .chars()
                .filter(|&c| c != char::REPLACEMENT_CHARACTER)
                .collect(),
        )
    }
}
