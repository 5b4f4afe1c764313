/// Default source tree, relative to the working directory.
pub const DEFAULT_SOURCE_DIR: &str = "vba_src";

/// Bounded queue between the filesystem watcher and the dispatcher. A full
/// queue blocks the watcher thread rather than dropping events.
pub const EVENT_QUEUE_CAPACITY: usize = 256;
