//! Identity session tracking.

mod watcher;

pub use watcher::SessionWatcher;
