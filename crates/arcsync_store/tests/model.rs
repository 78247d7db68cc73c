use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use arcsync_client::{
    ArchiveClient, CategoryEntry, ClientError, ExtractResult, IndexEntry, SearchQuery, SearchResult,
};
use arcsync_core::{ArchiveCollection, ErrorCode, FetchStrategy, LoadState};
use arcsync_store::{ArchiveStore, StoreObserver, SyncModel};
use async_trait::async_trait;
use bytes::Bytes;
use tokio::time::timeout;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(sync_logging::initialize_for_tests);
}

/// Client that always serves one fixed index entry.
struct OneArchiveClient;

#[async_trait]
impl ArchiveClient for OneArchiveClient {
    async fn fetch_index(&self) -> Result<Vec<IndexEntry>, ClientError> {
        Ok(vec![IndexEntry {
            arcid: "a1".to_string(),
            title: "Foo".to_string(),
            tags: None,
            isnew: None,
        }])
    }

    async fn fetch_metadata(&self, _id: &str) -> Result<IndexEntry, ClientError> {
        Err(ClientError::Network("unscripted call".to_string()))
    }

    async fn fetch_thumbnail(&self, _id: &str) -> Result<Bytes, ClientError> {
        Err(ClientError::Network("unscripted call".to_string()))
    }

    async fn extract(&self, _id: &str) -> Result<ExtractResult, ClientError> {
        Err(ClientError::Network("unscripted call".to_string()))
    }

    async fn fetch_page(&self, _page_ref: &str) -> Result<Bytes, ClientError> {
        Err(ClientError::Network("unscripted call".to_string()))
    }

    async fn fetch_categories(&self) -> Result<Vec<CategoryEntry>, ClientError> {
        Err(ClientError::Network("unscripted call".to_string()))
    }

    async fn search(&self, _query: &SearchQuery) -> Result<SearchResult, ClientError> {
        Err(ClientError::Network("unscripted call".to_string()))
    }
}

#[derive(Default)]
struct RecordingObserver {
    loading: Mutex<Vec<LoadState>>,
    items: Mutex<Vec<ArchiveCollection>>,
    errors: Mutex<Vec<Option<ErrorCode>>>,
}

impl RecordingObserver {
    fn saw_load_state(&self, state: LoadState) -> bool {
        self.loading.lock().unwrap().contains(&state)
    }

    fn loading_events(&self) -> usize {
        self.loading.lock().unwrap().len()
    }
}

impl StoreObserver for RecordingObserver {
    fn loading_changed(&self, state: LoadState) {
        self.loading.lock().unwrap().push(state);
    }

    fn items_changed(&self, items: ArchiveCollection) {
        self.items.lock().unwrap().push(items);
    }

    fn error_changed(&self, error: Option<ErrorCode>) {
        self.errors.lock().unwrap().push(error);
    }
}

async fn wait_until(deadline: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let check = async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    };
    timeout(deadline, check).await.is_ok()
}

#[tokio::test]
async fn attach_forwards_current_values_and_changes() {
    init_logging();
    let store = ArchiveStore::new(Arc::new(OneArchiveClient));
    let observer = Arc::new(RecordingObserver::default());
    let mut model = SyncModel::new(observer.clone());

    model.attach(&store);
    assert!(
        wait_until(Duration::from_secs(2), || observer
            .saw_load_state(LoadState::Idle))
        .await,
        "initial load state not forwarded"
    );
    assert!(
        wait_until(Duration::from_secs(2), || {
            !observer.errors.lock().unwrap().is_empty()
        })
        .await,
        "initial error state not forwarded"
    );

    store.load(FetchStrategy::FullIndex);
    assert!(
        wait_until(Duration::from_secs(2), || observer
            .saw_load_state(LoadState::Loaded))
        .await,
        "load completion not forwarded"
    );
    assert!(
        wait_until(Duration::from_secs(2), || {
            observer
                .items
                .lock()
                .unwrap()
                .last()
                .is_some_and(|items| items.contains("a1"))
        })
        .await,
        "merged items not forwarded"
    );
}

#[tokio::test]
async fn detach_stops_forwarding() {
    init_logging();
    let store = ArchiveStore::new(Arc::new(OneArchiveClient));
    let observer = Arc::new(RecordingObserver::default());
    let mut model = SyncModel::new(observer.clone());

    model.attach(&store);
    assert!(
        wait_until(Duration::from_secs(2), || observer.loading_events() > 0).await,
        "initial forward missing"
    );
    model.detach();
    tokio::time::sleep(Duration::from_millis(50)).await;
    let seen = observer.loading_events();

    // The store keeps working; the detached model just never hears about it.
    store.load(FetchStrategy::FullIndex);
    let mut rx = store.subscribe_load_state();
    timeout(
        Duration::from_secs(2),
        rx.wait_for(|state| *state == LoadState::Loaded),
    )
    .await
    .expect("store did not finish loading")
    .expect("store task gone");

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(observer.loading_events(), seen);
    assert!(!observer.saw_load_state(LoadState::Loaded));
}

#[tokio::test]
async fn detach_is_idempotent_and_safe_without_attach() {
    init_logging();
    let observer = Arc::new(RecordingObserver::default());
    let mut model = SyncModel::new(observer.clone());

    // Never attached.
    model.detach();
    model.detach();

    let store = ArchiveStore::new(Arc::new(OneArchiveClient));
    model.attach(&store);
    model.detach();
    model.detach();
    assert!(!observer.saw_load_state(LoadState::Loaded));
}

#[tokio::test]
async fn reattach_replaces_the_previous_subscription() {
    init_logging();
    let store = ArchiveStore::new(Arc::new(OneArchiveClient));
    let observer = Arc::new(RecordingObserver::default());
    let mut model = SyncModel::new(observer.clone());

    model.attach(&store);
    model.attach(&store);
    store.load(FetchStrategy::FullIndex);
    assert!(
        wait_until(Duration::from_secs(2), || observer
            .saw_load_state(LoadState::Loaded))
        .await,
        "load completion not forwarded after reattach"
    );
}
