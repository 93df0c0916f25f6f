//! A state entry bound to a fixed name and location.

use keyhook_core::AppResult;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::path::PathBuf;

use crate::location::StateLocation;
use crate::store::{StateStore, WriteOutcome};

/// Typed handle over one whole-document state entry.
///
/// Every method delegates to the matching [`StateStore`] primitive.
///
/// # Example
/// ```no_run
/// use keyhook_state::{StateHandle, StateLocation, StateStore};
/// use std::path::Path;
///
/// let store = StateStore::new(Path::new("."));
/// let runs: StateHandle<u64> = StateHandle::new(store, "runs", StateLocation::Local);
/// runs.update(|prev| prev.unwrap_or(0) + 1);
/// ```
#[derive(Debug, Clone)]
pub struct StateHandle<T> {
    store: StateStore,
    name: String,
    location: StateLocation,
    _marker: PhantomData<fn() -> T>,
}

impl<T> StateHandle<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(store: StateStore, name: impl Into<String>, location: StateLocation) -> Self {
        Self {
            store,
            name: name.into(),
            location,
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> StateLocation {
        self.location
    }

    /// Current value, if present and parsable.
    pub fn get(&self) -> Option<T> {
        self.store.read(&self.name, self.location).into_data()
    }

    pub fn set(&self, value: &T) -> WriteOutcome {
        self.store.write(&self.name, value, self.location)
    }

    pub fn update<F>(&self, transform: F) -> WriteOutcome
    where
        F: FnOnce(Option<T>) -> T,
    {
        self.store.update(&self.name, self.location, transform)
    }

    pub fn exists(&self) -> bool {
        self.store.exists(&self.name, self.location)
    }

    pub fn clear(&self) -> bool {
        self.store.clear(&self.name, self.location)
    }

    pub fn path(&self) -> AppResult<PathBuf> {
        self.store.path_for(&self.name, self.location)
    }
}
