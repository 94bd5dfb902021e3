//! Load progress hooks.
//!
//! [`read_collisions`](crate::read_collisions) only knows how many bytes of
//! the collision file it has consumed; how that is shown (a terminal bar,
//! nothing at all) is left to the caller.

/// Receives byte-based progress while a collision file is read.
pub trait ProgressCallback: Send + Sync {
    /// Total size of the input in bytes, when known up front.
    fn set_total(&self, total: u64);

    /// Bytes consumed so far.
    fn set_position(&self, pos: u64);

    /// Short status text, e.g. the running collision count.
    fn set_message(&self, msg: String);

    /// Called once when reading stops.
    fn finish(&self, msg: String);
}

/// Discards every update. Used by tests and library callers without a
/// terminal.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn set_position(&self, _pos: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}
