#![forbid(unsafe_code)]

pub mod bank;
pub mod repository;
pub mod sqlite;

pub use bank::{BankLoadError, load_bank, parse_bank};
pub use repository::{
    InMemoryRepository, LeaderboardRepository, PlayerProfileRepository, Storage, StorageError,
};
pub use sqlite::{SqliteInitError, SqliteRepository};
