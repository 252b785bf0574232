use serde::de::DeserializeOwned;
use serde::Serialize;

/// Marker trait for every event payload: it has to survive a round trip through the store.
pub trait Event: Serialize + DeserializeOwned {}

impl<T> Event for T where T: Serialize + DeserializeOwned {}
