//! Source locations attached to semantic nodes.
//!
//! Spans use a packed 64-bit representation so that every declaration can
//! carry its location by value:
//! - Bits 0-23: offset (24 bits)
//! - Bits 24-39: length (16 bits)
//! - Bits 40-63: source id (24 bits)
//!
//! Source id 1 is reserved for compiler-synthesized entities (built-ins).

use serde::Serialize;
use std::num::NonZeroU32;

use crate::name_supply::Name;

/// Identifies one source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SourceId(NonZeroU32);

impl SourceId {
    pub const BUILTIN: SourceId = SourceId(NonZeroU32::new(1).unwrap());

    /// create a new SourceId. panics if id is zero.
    pub fn new(id: u32) -> Self {
        SourceId(NonZeroU32::new(id).expect("SourceId must be non-zero"))
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Source id and byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SourceLoc {
    pub source_id: SourceId,
    pub offset: u32,
}

impl SourceLoc {
    pub fn new(source_id: SourceId, offset: u32) -> Self {
        SourceLoc { source_id, offset }
    }

    pub fn builtin() -> Self {
        SourceLoc::new(SourceId::BUILTIN, 0)
    }
}

impl Default for SourceLoc {
    fn default() -> Self {
        Self::builtin()
    }
}

/// A byte range inside one source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SourceSpan(u64);

impl SourceSpan {
    const OFFSET_BITS: u64 = 24;
    const LENGTH_BITS: u64 = 16;
    const SOURCE_ID_BITS: u64 = 24;

    const OFFSET_MASK: u64 = (1 << Self::OFFSET_BITS) - 1;
    const LENGTH_MASK: u64 = (1 << Self::LENGTH_BITS) - 1;
    const SOURCE_ID_MASK: u64 = (1 << Self::SOURCE_ID_BITS) - 1;

    const LENGTH_SHIFT: u64 = Self::OFFSET_BITS;
    const SOURCE_ID_SHIFT: u64 = Self::OFFSET_BITS + Self::LENGTH_BITS;

    /// Span between two locations. Locations in different buffers degrade to
    /// an empty span at `start`.
    pub fn new(start: SourceLoc, end: SourceLoc) -> Self {
        if start.source_id != end.source_id {
            return Self::with_length(start.source_id, start.offset, 0);
        }
        Self::with_length(start.source_id, start.offset, end.offset.saturating_sub(start.offset))
    }

    /// Offsets beyond 16 MiB are clamped; lengths beyond 64 KiB are clamped.
    pub fn with_length(source_id: SourceId, offset: u32, length: u32) -> Self {
        let id = source_id.get() as u64;
        assert!(id <= Self::SOURCE_ID_MASK, "SourceId exceeds 24-bit limit: {}", id);

        let offset = (offset as u64).min(Self::OFFSET_MASK);
        let length = (length as u64).min(Self::LENGTH_MASK);
        Self(offset | (length << Self::LENGTH_SHIFT) | (id << Self::SOURCE_ID_SHIFT))
    }

    /// Location of compiler-synthesized entities.
    pub fn builtin() -> Self {
        Self::with_length(SourceId::BUILTIN, 0, 0)
    }

    pub fn source_id(&self) -> SourceId {
        SourceId::new(((self.0 >> Self::SOURCE_ID_SHIFT) & Self::SOURCE_ID_MASK) as u32)
    }

    pub fn offset(&self) -> u32 {
        (self.0 & Self::OFFSET_MASK) as u32
    }

    pub fn len(&self) -> u32 {
        ((self.0 >> Self::LENGTH_SHIFT) & Self::LENGTH_MASK) as u32
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn start(&self) -> SourceLoc {
        SourceLoc::new(self.source_id(), self.offset())
    }

    pub fn end(&self) -> SourceLoc {
        SourceLoc::new(self.source_id(), self.offset() + self.len())
    }

    pub fn is_builtin(&self) -> bool {
        self.source_id() == SourceId::BUILTIN
    }
}

impl Default for SourceSpan {
    fn default() -> Self {
        Self::builtin()
    }
}

impl std::fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_builtin() {
            return write!(f, "<builtin>");
        }
        write!(f, "{}:{}..{}", self.source_id(), self.offset(), self.offset() + self.len())
    }
}

/// Location and unique identity of a semantic node.
///
/// `name` is assigned by whoever built the node; nodes without a name can't
/// take part in use-def tracking and can't stand for an anonymous tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NodeInfo {
    pub span: SourceSpan,
    pub name: Option<Name>,
}

impl NodeInfo {
    pub fn new(span: SourceSpan, name: Name) -> Self {
        NodeInfo { span, name: Some(name) }
    }

    pub fn only_span(span: SourceSpan) -> Self {
        NodeInfo { span, name: None }
    }

    pub fn builtin() -> Self {
        Self::only_span(SourceSpan::builtin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_packing() {
        let span = SourceSpan::with_length(SourceId::new(7), 1234, 56);
        assert_eq!(span.source_id(), SourceId::new(7));
        assert_eq!(span.offset(), 1234);
        assert_eq!(span.len(), 56);
        assert_eq!(span.end().offset, 1290);
        assert_eq!(span.to_string(), "7:1234..1290");
    }

    #[test]
    fn test_span_across_buffers_is_empty() {
        let start = SourceLoc::new(SourceId::new(2), 10);
        let end = SourceLoc::new(SourceId::new(3), 20);
        let span = SourceSpan::new(start, end);
        assert!(span.is_empty());
        assert_eq!(span.start(), start);
    }

    #[test]
    fn test_builtin() {
        assert!(SourceSpan::builtin().is_builtin());
        assert_eq!(SourceSpan::default(), SourceSpan::builtin());
        assert_eq!(SourceLoc::default(), SourceLoc::builtin());
        assert_eq!(SourceSpan::builtin().to_string(), "<builtin>");
        assert!(NodeInfo::builtin().name.is_none());
    }
}
