use crate::confirm::ConfirmGate;
use crate::storage::Store;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    /// Held for the whole load, mutate, save cycle so writers take turns.
    pub writer: Arc<Mutex<()>>,
    pub confirm: Arc<Mutex<ConfirmGate>>,
}

impl AppState {
    pub fn new(store: Store) -> Self {
        Self {
            store,
            writer: Arc::new(Mutex::new(())),
            confirm: Arc::new(Mutex::new(ConfirmGate::default())),
        }
    }
}
