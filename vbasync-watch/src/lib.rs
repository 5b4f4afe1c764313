//! Watch mode: filesystem watcher + sequential dispatcher.
//!
//! File events from the source tree enter a bounded queue with a single
//! consumer, which pushes each changed file into the document one at a time.

pub mod dispatcher;
mod error;
pub mod event;
pub mod paths;
mod runtime;
pub mod watcher;

pub use dispatcher::{DispatchSummary, Dispatcher};
pub use error::WatchError;
pub use event::{file_events, FileEvent, FileEventKind};
pub use runtime::{init_tracing, run, run_with_shutdown, start_blocking, WatchConfig};
