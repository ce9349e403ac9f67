use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::favourites::storage::KeyValueStorage;
use crate::models::MovieSummary;

/// Storage key holding the JSON-encoded favourites list
pub const FAVOURITES_KEY: &str = "favourites";

/// Immutable point-in-time value of the favourites collection
pub type Snapshot = Arc<Vec<MovieSummary>>;

type Listener = Arc<dyn Fn(&Snapshot) + Send + Sync>;

struct State {
    snapshot: Snapshot,
    listeners: Vec<(u64, Listener)>,
    next_listener_id: u64,
}

struct Shared {
    state: Mutex<State>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Handle returned by [`FavouritesStore::subscribe`]
#[must_use = "dropping the handle keeps the listener registered; call unsubscribe() to detach"]
pub struct Subscription {
    id: u64,
    shared: Weak<Shared>,
}

impl Subscription {
    /// Detaches this listener; other subscribers are unaffected
    pub fn unsubscribe(self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.lock().listeners.retain(|(id, _)| *id != self.id);
        }
    }
}

/// Ordered, duplicate-free favourites list mirrored to durable storage
///
/// Every mutation builds a new snapshot, writes it to storage, swaps it in and
/// then calls every listener with it. Storage is best effort: a failed write is
/// logged and the in-memory snapshot stays authoritative. Without a storage
/// handle all storage operations are skipped.
///
/// Mutations and subscriptions are serialised. Listeners run after the state
/// lock is released, so they may read the store, but must not mutate it.
pub struct FavouritesStore {
    shared: Arc<Shared>,
    storage: Option<Arc<dyn KeyValueStorage>>,
    mutation: Mutex<()>,
    initialized: AtomicBool,
}

impl FavouritesStore {
    pub fn new(storage: Option<Arc<dyn KeyValueStorage>>) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State {
                    snapshot: Arc::new(Vec::new()),
                    listeners: Vec::new(),
                    next_listener_id: 0,
                }),
            }),
            storage,
            mutation: Mutex::new(()),
            initialized: AtomicBool::new(false),
        }
    }

    /// Hydrates the collection from storage; only the first call does anything
    ///
    /// A stored value that is not a valid favourites list is deleted and the
    /// collection stays empty.
    pub fn initialize(&self) {
        if self.initialized.swap(true, Ordering::SeqCst) {
            return;
        }

        let Some(storage) = &self.storage else {
            tracing::debug!("No storage available, favourites start empty");
            return;
        };

        let _guard = self.lock_mutation();

        let raw = match storage.get(FAVOURITES_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read stored favourites");
                return;
            }
        };

        let stored: Vec<MovieSummary> = match serde_json::from_str(&raw) {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(error = %e, "Discarding corrupted favourites");
                if let Err(e) = storage.remove(FAVOURITES_KEY) {
                    tracing::warn!(error = %e, "Failed to clear corrupted favourites");
                }
                return;
            }
        };

        let stored_len = stored.len();
        let mut movies: Vec<MovieSummary> = Vec::with_capacity(stored_len);
        for movie in stored {
            if !movies.contains(&movie) {
                movies.push(movie);
            }
        }

        let snapshot = Arc::new(movies);
        if snapshot.len() != stored_len {
            tracing::warn!(
                stored = stored_len,
                kept = snapshot.len(),
                "Dropped duplicate favourites while loading"
            );
            self.persist(&snapshot);
        }

        tracing::info!(count = snapshot.len(), "Favourites loaded");
        self.publish(snapshot);
    }

    /// Appends `movie` unless a movie with the same id is already present
    ///
    /// Returns whether the collection changed. A duplicate causes no write and
    /// no notification.
    pub fn add(&self, movie: MovieSummary) -> bool {
        let _guard = self.lock_mutation();
        let current = self.snapshot();

        if current.contains(&movie) {
            tracing::debug!(id = %movie.id, "Movie already in favourites");
            return false;
        }

        let mut next = Vec::with_capacity(current.len() + 1);
        next.extend(current.iter().cloned());
        next.push(movie);
        self.commit(next);
        true
    }

    /// Removes the movie with `id`; returns whether anything was removed
    pub fn remove(&self, id: &str) -> bool {
        let _guard = self.lock_mutation();
        let current = self.snapshot();

        if !current.iter().any(|m| m.id == id) {
            return false;
        }

        let next = current.iter().filter(|m| m.id != id).cloned().collect();
        self.commit(next);
        true
    }

    pub fn clear(&self) {
        let _guard = self.lock_mutation();
        self.commit(Vec::new());
    }

    /// Registers `listener`, calling it right away with the current snapshot
    /// and again after every mutation
    ///
    /// Serialised with mutations, so the first delivery can never arrive
    /// after a newer snapshot.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Snapshot) + Send + Sync + 'static,
    {
        let _guard = self.lock_mutation();
        let listener: Listener = Arc::new(listener);

        let (id, snapshot) = {
            let mut state = self.shared.lock();
            let id = state.next_listener_id;
            state.next_listener_id += 1;
            state.listeners.push((id, listener.clone()));
            (id, state.snapshot.clone())
        };

        listener(&snapshot);

        Subscription {
            id,
            shared: Arc::downgrade(&self.shared),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.shared.lock().snapshot.clone()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.shared.lock().snapshot.iter().any(|m| m.id == id)
    }

    pub fn len(&self) -> usize {
        self.shared.lock().snapshot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock_mutation(&self) -> MutexGuard<'_, ()> {
        self.mutation.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn commit(&self, next: Vec<MovieSummary>) {
        let snapshot = Arc::new(next);
        self.persist(&snapshot);
        self.publish(snapshot);
    }

    fn persist(&self, snapshot: &Snapshot) {
        let Some(storage) = &self.storage else {
            return;
        };

        let encoded = match serde_json::to_string(snapshot.as_ref()) {
            Ok(encoded) => encoded,
            Err(e) => {
                tracing::error!(error = %e, "Favourites serialization error");
                return;
            }
        };

        if let Err(e) = storage.set(FAVOURITES_KEY, &encoded) {
            tracing::warn!(error = %e, count = snapshot.len(), "Failed to persist favourites");
        }
    }

    fn publish(&self, snapshot: Snapshot) {
        let listeners: Vec<Listener> = {
            let mut state = self.shared.lock();
            state.snapshot = snapshot.clone();
            state.listeners.iter().map(|(_, l)| l.clone()).collect()
        };

        for listener in listeners {
            listener(&snapshot);
        }
    }
}
