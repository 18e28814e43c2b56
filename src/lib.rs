mod error;
mod id;
mod model;

pub mod config;
pub mod export;
pub mod logging;
pub mod stores;

pub use config::StoreConfig;
pub use error::{Error, Result};
pub use id::IdGenerator;
pub use model::{Account, AccountType, Label};
pub use stores::{
    AccountStore, FileBackend, KeyValueBackend, LoadOutcome, MemoryBackend, STORAGE_KEY,
};
