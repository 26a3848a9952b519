//! SharedStore - passive string key-value store
//!
//! A flat mapping from string keys to string values that any number of
//! processes can read and write. There is no compare-and-swap, no
//! transaction, and no change notification: readers poll.
//!
//! # Backends
//!
//! ```text
//! MemoryStore   Arc<Mutex<HashMap>>, shared by clones in one process
//! FileStore     {store_path}/
//!               ├── status
//!               ├── roster
//!               └── ...          one file per key, value is the file body
//! ```
//!
//! # Example
//!
//! ```ignore
//! use sharedstore::{FileStore, SharedStore};
//!
//! let store = FileStore::open("/tmp/turntalk")?;
//! store.set("status", "OPEN").await?;
//! assert_eq!(store.get("status").await?, "OPEN");
//! ```

pub mod cli;
pub mod config;
mod error;
mod file;
mod memory;
mod store;

pub use error::StoreError;
pub use file::FileStore;
pub use memory::MemoryStore;
pub use store::{SharedStore, validate_key};

/// Directory name used under the platform data/config dirs
pub const APP_DIR: &str = "turntalk";
