//! # Emission Buffer
//!
//! Two append-only text builders and one splice point:
//!
//! ```text
//!   pre                                  post
//!   ┌──────────────────────────────┐     ┌──────────────────────────────┐
//!   │ ... <wiki:Page rdf:about=... │     │ >\n  <property:Bar>5</pro... │
//!   └─────────────────────────▲────┘     └──────────────────────────────┘
//!                             │
//!                        splice point: namespace attributes go here
//! ```
//!
//! While a block is open, `pre` ends inside the start tag of the block's
//! root element, and everything else goes to `post`. Attributes discovered
//! later in the walk are inserted at the splice point. Closing the block
//! merges `post` into `pre`; once closed, text is appended to `pre`
//! directly, since there is nothing left to splice into.

use crate::ExportError;

/// Byte offset in `pre` where attributes of the open block are inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplicePoint(usize);

impl SplicePoint {
    /// The byte offset.
    #[must_use]
    pub fn offset(self) -> usize {
        self.0
    }
}

/// Whether the most recent block start tag can still take attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockState {
    /// A start tag is open; attributes are spliced in at the point.
    Open(SplicePoint),
    /// No start tag can be amended.
    #[default]
    Closed,
}

/// The two-part text buffer of a serializer.
#[derive(Debug, Clone, Default)]
pub struct EmissionBuffer {
    pre: String,
    post: String,
    block: BlockState,
}

impl EmissionBuffer {
    /// Create an empty buffer with no open block.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new block with `text`, which must end inside a start tag.
    ///
    /// At most one block is open at a time.
    pub fn open_block(&mut self, text: &str) -> Result<(), ExportError> {
        if self.is_open() {
            return Err(ExportError::InvalidState(
                "a namespace block is already open".to_string(),
            ));
        }
        self.pre.push_str(text);
        self.block = BlockState::Open(SplicePoint(self.pre.len()));
        Ok(())
    }

    /// Append text that can no longer receive spliced attributes.
    pub fn append(&mut self, text: &str) {
        match self.block {
            BlockState::Open(_) => self.post.push_str(text),
            BlockState::Closed => self.pre.push_str(text),
        }
    }

    /// Insert attribute text into the start tag of the open block.
    pub fn splice(&mut self, attribute: &str) -> Result<(), ExportError> {
        let BlockState::Open(point) = self.block else {
            return Err(ExportError::InvalidState(
                "no open namespace block to declare into".to_string(),
            ));
        };
        self.pre.insert_str(point.offset(), attribute);
        self.block = BlockState::Open(SplicePoint(point.offset() + attribute.len()));
        Ok(())
    }

    /// End the open block, merging `post` into `pre`.
    pub fn close_block(&mut self) {
        self.pre.push_str(&self.post);
        self.post.clear();
        self.block = BlockState::Closed;
    }

    /// Take all buffered text and reset to an empty, closed buffer.
    pub fn take(&mut self) -> String {
        let mut out = std::mem::take(&mut self.pre);
        out.push_str(&self.post);
        self.post.clear();
        self.block = BlockState::Closed;
        out
    }

    /// Whether a block is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self.block, BlockState::Open(_))
    }

    /// Whether nothing is buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pre.is_empty() && self.post.is_empty()
    }

    /// Drop all text and close the block.
    pub fn clear(&mut self) {
        self.pre.clear();
        self.post.clear();
        self.block = BlockState::Closed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_block_sets_splice_point() {
        let mut buf = EmissionBuffer::new();
        buf.append("prolog\n");
        buf.open_block("<a").expect("open");
        assert_eq!(buf.block, BlockState::Open(SplicePoint(9)));
        assert_eq!(buf.pre, "prolog\n<a");
    }

    #[test]
    fn second_open_block_rejected() {
        let mut buf = EmissionBuffer::new();
        buf.open_block("<a").expect("open");
        assert!(matches!(
            buf.open_block("<b"),
            Err(ExportError::InvalidState(_))
        ));
    }

    #[test]
    fn splice_lands_in_open_tag() {
        let mut buf = EmissionBuffer::new();
        buf.open_block("<a").expect("open");
        buf.append(" x=\"1\">");
        buf.append("</a>");
        buf.splice(" xmlns:p=\"u\"").expect("splice");
        buf.splice(" xmlns:q=\"v\"").expect("splice");
        assert_eq!(buf.take(), "<a xmlns:p=\"u\" xmlns:q=\"v\" x=\"1\"></a>");
    }

    #[test]
    fn splice_without_block_fails() {
        let mut buf = EmissionBuffer::new();
        assert!(matches!(
            buf.splice(" xmlns:p=\"u\""),
            Err(ExportError::InvalidState(_))
        ));
    }

    #[test]
    fn closed_buffer_appends_to_pre() {
        let mut buf = EmissionBuffer::new();
        buf.open_block("<a").expect("open");
        buf.append("/>");
        buf.close_block();
        buf.append("<b/>");
        assert_eq!(buf.pre, "<a/><b/>");
        assert!(buf.post.is_empty());
        assert!(!buf.is_open());
    }

    #[test]
    fn take_resets() {
        let mut buf = EmissionBuffer::new();
        buf.open_block("<a").expect("open");
        buf.append("/>");
        assert_eq!(buf.take(), "<a/>");
        assert!(buf.is_empty());
        assert_eq!(buf.block, BlockState::Closed);
    }
}
