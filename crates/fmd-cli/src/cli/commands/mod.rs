//! CLI command handlers. Each command is in its own file.

mod checksum;
mod clear_cache;
mod download;
mod import;
mod info;
mod install;
mod search;
mod serve;
mod set_path;

pub use checksum::run_checksum;
pub use clear_cache::run_clear_cache;
pub use download::run_download;
pub use import::run_import;
pub use info::run_info;
pub use install::run_install;
pub use search::run_search;
pub use serve::run_serve;
pub use set_path::run_set_path;
