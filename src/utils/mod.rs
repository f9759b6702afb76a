pub mod data_loader;
pub mod dedup;
pub mod paths;

pub use data_loader::{LoadStats, LoadedEvents, load_all_events};
pub use dedup::dedup_first;
pub use paths::get_claude_paths;
