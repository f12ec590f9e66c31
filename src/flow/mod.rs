//! Stream transport, cancellation, and the generic combinators built on them.

pub mod cancel;
pub mod gather;
pub mod generator;
pub mod jitter;
pub mod merge;
pub mod split;
pub mod stream;
pub mod task;

pub use cancel::CancellationSignal;
pub use gather::{gather_first, gather_first_each, search};
pub use generator::generate;
pub use jitter::Jitter;
pub use merge::merge;
pub use split::split;
pub use stream::{CloseGuard, RecvOutcome, Stream, StreamReader};
pub use task::{Task, join_all};
