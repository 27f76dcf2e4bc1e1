//! Upload execution: per-attempt contexts, the retrying executor and the parallel dispatcher

pub mod context;
pub mod parallel;
pub mod retry;

pub use context::UploadAttemptContext;
pub use parallel::{DispatchOutcome, ParallelDispatcher};
pub use retry::{RetryPolicy, RetryingUploadExecutor};
