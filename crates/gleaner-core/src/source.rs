//! The narrow contract the dispatch layer demands of its inputs

/// A readable input whose read position can be reset to the start.
///
/// [`Chained`](crate::Chained) rewinds its input before invoking each
/// sub-extractor so that every one of them observes the same content,
/// regardless of how much an earlier sub-extractor consumed. Inputs
/// without a read cursor are trivially rewindable; for them the
/// operation is a no-op.
///
/// Implemented by `gleaner-response`'s `Response`; implement it for any
/// other input type that should work with `Chained`.
pub trait Rewind {
    /// Reset the read position to the start of the input
    fn rewind(&self);
}

impl Rewind for str {
    fn rewind(&self) {}
}

impl Rewind for String {
    fn rewind(&self) {}
}

impl Rewind for [u8] {
    fn rewind(&self) {}
}
