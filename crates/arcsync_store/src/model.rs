use std::sync::Arc;

use arcsync_core::{ArchiveCollection, ErrorCode, LoadState};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::store::ArchiveStore;

/// Presentation-side observer of the store's three published fields.
pub trait StoreObserver: Send + Sync + 'static {
    fn loading_changed(&self, state: LoadState);
    fn items_changed(&self, items: ArchiveCollection);
    fn error_changed(&self, error: Option<ErrorCode>);
}

/// Mirrors the store's published fields to a [`StoreObserver`] for as long
/// as it stays attached.
///
/// `attach` forwards the current value of each field and every later change.
/// `detach` stops forwarding but does not cancel the store's in-flight
/// fetches, which complete and mutate store state unobserved. Both calls are
/// idempotent; `detach` without a prior `attach` is a no-op.
pub struct SyncModel {
    observer: Arc<dyn StoreObserver>,
    forwarding: Option<CancellationToken>,
}

impl SyncModel {
    pub fn new(observer: Arc<dyn StoreObserver>) -> Self {
        Self {
            observer,
            forwarding: None,
        }
    }

    pub fn attach(&mut self, store: &ArchiveStore) {
        self.detach();
        let token = CancellationToken::new();

        let observer = Arc::clone(&self.observer);
        spawn_forwarder(store.subscribe_load_state(), token.clone(), move |state| {
            observer.loading_changed(state);
        });
        let observer = Arc::clone(&self.observer);
        spawn_forwarder(store.subscribe_items(), token.clone(), move |items| {
            observer.items_changed(items);
        });
        let observer = Arc::clone(&self.observer);
        spawn_forwarder(store.subscribe_error_code(), token.clone(), move |error| {
            observer.error_changed(error);
        });

        self.forwarding = Some(token);
    }

    pub fn detach(&mut self) {
        if let Some(token) = self.forwarding.take() {
            token.cancel();
        }
    }
}

impl Drop for SyncModel {
    fn drop(&mut self) {
        self.detach();
    }
}

fn spawn_forwarder<T, F>(mut rx: watch::Receiver<T>, token: CancellationToken, forward: F)
where
    T: Clone + Send + Sync + 'static,
    F: Fn(T) + Send + 'static,
{
    tokio::spawn(async move {
        if token.is_cancelled() {
            return;
        }
        let current = rx.borrow_and_update().clone();
        forward(current);
        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                changed = rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let value = rx.borrow_and_update().clone();
                    // The token is checked again so that a cancellation that
                    // raced the change notification still wins.
                    if token.is_cancelled() {
                        break;
                    }
                    forward(value);
                }
            }
        }
    });
}
