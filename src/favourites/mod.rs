//! Client-side favourites list with durable mirroring.

pub mod storage;
pub mod store;

pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, StorageError};
pub use store::{FavouritesStore, Snapshot, Subscription, FAVOURITES_KEY};
