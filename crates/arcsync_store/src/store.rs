use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use arcsync_client::{ArchiveClient, ClientError, IndexEntry, SearchQuery, SearchResult};
use arcsync_core::{ArchiveCollection, ArchiveItem, ErrorCode, FetchStrategy, LoadState};
use bytes::Bytes;
use sync_logging::{sync_debug, sync_trace, sync_warn};
use tokio::sync::{mpsc, watch};

/// Handle to the archive store actor.
///
/// All mutable state (collection, load state, error code, in-flight
/// thumbnail markers) lives on a single consumer task; the handle only sends
/// commands and hands out watch subscriptions, so every mutation is
/// serialized regardless of which thread a completion arrives on. Fetch
/// tasks keep the actor alive until they deliver their result, even after
/// the handle is dropped.
pub struct ArchiveStore {
    msg_tx: mpsc::UnboundedSender<StoreMsg>,
    load_rx: watch::Receiver<LoadState>,
    items_rx: watch::Receiver<ArchiveCollection>,
    error_rx: watch::Receiver<Option<ErrorCode>>,
}

enum StoreMsg {
    Load(FetchStrategy),
    RequestThumbnail(String),
    IndexFetched(Result<Vec<IndexEntry>, ClientError>),
    SearchFetched(Result<SearchResult, ClientError>),
    MetadataFetched(Result<IndexEntry, ClientError>),
    ThumbnailFetched {
        id: String,
        result: Result<Bytes, ClientError>,
    },
}

impl ArchiveStore {
    /// Spawns the state-owning actor; must be called inside a tokio runtime.
    pub fn new(client: Arc<dyn ArchiveClient>) -> Self {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        let (load_tx, load_rx) = watch::channel(LoadState::Idle);
        let (items_tx, items_rx) = watch::channel(ArchiveCollection::new());
        let (error_tx, error_rx) = watch::channel(None);

        let task = StoreTask {
            client,
            msg_tx: msg_tx.downgrade(),
            items: ArchiveCollection::new(),
            outstanding: 0,
            pending_thumbnails: HashSet::new(),
            load_tx,
            items_tx,
            error_tx,
        };
        tokio::spawn(task.run(msg_rx));

        Self {
            msg_tx,
            load_rx,
            items_rx,
            error_rx,
        }
    }

    /// Starts populating the collection with the given strategy.
    ///
    /// A no-op when the collection already holds items (non-emptiness is the
    /// "already loaded" guard, independent of the strategy argument) or when
    /// a load is still in flight.
    pub fn load(&self, strategy: FetchStrategy) {
        let _ = self.msg_tx.send(StoreMsg::Load(strategy));
    }

    /// Lazily resolves one thumbnail, typically on an item becoming visible.
    ///
    /// Requests for unknown ids, already resolved thumbnails and ids with a
    /// fetch already in flight are dropped. A failed fetch leaves the
    /// thumbnail unresolved, so a later request for the same id retries.
    pub fn request_thumbnail(&self, id: impl Into<String>) {
        let _ = self.msg_tx.send(StoreMsg::RequestThumbnail(id.into()));
    }

    pub fn load_state(&self) -> LoadState {
        *self.load_rx.borrow()
    }

    pub fn items(&self) -> ArchiveCollection {
        self.items_rx.borrow().clone()
    }

    pub fn error_code(&self) -> Option<ErrorCode> {
        *self.error_rx.borrow()
    }

    pub fn subscribe_load_state(&self) -> watch::Receiver<LoadState> {
        self.load_rx.clone()
    }

    pub fn subscribe_items(&self) -> watch::Receiver<ArchiveCollection> {
        self.items_rx.clone()
    }

    pub fn subscribe_error_code(&self) -> watch::Receiver<Option<ErrorCode>> {
        self.error_rx.clone()
    }
}

struct StoreTask {
    client: Arc<dyn ArchiveClient>,
    // Weak so the actor winds down once the handle and all in-flight fetch
    // tasks are gone.
    msg_tx: mpsc::WeakUnboundedSender<StoreMsg>,
    items: ArchiveCollection,
    outstanding: usize,
    pending_thumbnails: HashSet<String>,
    load_tx: watch::Sender<LoadState>,
    items_tx: watch::Sender<ArchiveCollection>,
    error_tx: watch::Sender<Option<ErrorCode>>,
}

impl StoreTask {
    async fn run(mut self, mut msg_rx: mpsc::UnboundedReceiver<StoreMsg>) {
        while let Some(msg) = msg_rx.recv().await {
            self.handle(msg);
        }
        sync_trace!("archive store task finished");
    }

    fn handle(&mut self, msg: StoreMsg) {
        match msg {
            StoreMsg::Load(strategy) => self.begin_load(strategy),
            StoreMsg::RequestThumbnail(id) => self.begin_thumbnail(id),
            StoreMsg::IndexFetched(result) => self.finish_index(result),
            StoreMsg::SearchFetched(result) => self.finish_search(result),
            StoreMsg::MetadataFetched(result) => self.finish_metadata(result),
            StoreMsg::ThumbnailFetched { id, result } => self.finish_thumbnail(id, result),
        }
    }

    fn begin_load(&mut self, strategy: FetchStrategy) {
        if !self.items.is_empty() {
            sync_debug!(
                "load skipped: collection already holds {} items",
                self.items.len()
            );
            return;
        }
        if *self.load_tx.borrow() == LoadState::Loading {
            sync_warn!("load skipped: a load is already in flight");
            return;
        }
        self.load_tx.send_replace(LoadState::Loading);
        match strategy {
            FetchStrategy::FullIndex => {
                self.outstanding = 1;
                self.spawn_fetch(|client| async move {
                    StoreMsg::IndexFetched(client.fetch_index().await)
                });
            }
            FetchStrategy::Search(keyword) => {
                self.outstanding = 1;
                self.spawn_fetch(move |client| async move {
                    let query = SearchQuery::with_filter(keyword);
                    StoreMsg::SearchFetched(client.search(&query).await)
                });
            }
            FetchStrategy::CategorySubset(ids) => {
                if ids.is_empty() {
                    self.load_tx.send_replace(LoadState::Loaded);
                    return;
                }
                self.outstanding = ids.len();
                // One independent fetch per id; arrival order does not matter
                // because merging is insert-if-absent.
                for id in ids {
                    self.spawn_fetch(move |client| async move {
                        StoreMsg::MetadataFetched(client.fetch_metadata(&id).await)
                    });
                }
            }
        }
    }

    fn finish_index(&mut self, result: Result<Vec<IndexEntry>, ClientError>) {
        match result {
            Ok(entries) => self.merge_entries(entries),
            Err(err) => {
                sync_warn!("index load failed: {err}");
                self.error_tx.send_replace(Some(ErrorCode::ARCHIVE_FETCH));
            }
        }
        self.complete_one();
    }

    fn finish_search(&mut self, result: Result<SearchResult, ClientError>) {
        match result {
            Ok(result) => self.merge_entries(result.data),
            Err(err) => {
                sync_warn!("search load failed: {err}");
                self.error_tx.send_replace(Some(ErrorCode::ARCHIVE_FETCH));
            }
        }
        self.complete_one();
    }

    fn finish_metadata(&mut self, result: Result<IndexEntry, ClientError>) {
        match result {
            Ok(entry) => self.merge_entries([entry]),
            // One failed id neither fails the rest of the subset nor sets an
            // error code; the item is simply absent.
            Err(err) => sync_warn!("metadata load failed: {err}"),
        }
        self.complete_one();
    }

    fn begin_thumbnail(&mut self, id: String) {
        let Some(item) = self.items.get(&id) else {
            sync_trace!("thumbnail request for unknown id {id}");
            return;
        };
        if item.thumbnail.is_resolved() {
            return;
        }
        // Single-flight per id: repeated visibility signals while a fetch is
        // in progress collapse into the first one.
        if !self.pending_thumbnails.insert(id.clone()) {
            return;
        }
        self.spawn_fetch(move |client| async move {
            let result = client.fetch_thumbnail(&id).await;
            StoreMsg::ThumbnailFetched { id, result }
        });
    }

    fn finish_thumbnail(&mut self, id: String, result: Result<Bytes, ClientError>) {
        self.pending_thumbnails.remove(&id);
        match result {
            Ok(bytes) => {
                if self.items.set_thumbnail(&id, bytes) {
                    self.items_tx.send_replace(self.items.clone());
                }
            }
            // Thumbnail failures stay silent: the item keeps its placeholder
            // and a later visibility signal retries.
            Err(err) => sync_debug!("thumbnail fetch for {id} failed: {err}"),
        }
    }

    fn merge_entries(&mut self, entries: impl IntoIterator<Item = IndexEntry>) {
        let mut changed = false;
        for entry in entries {
            changed |= self
                .items
                .insert_if_absent(ArchiveItem::new(entry.arcid, entry.title));
        }
        if changed {
            self.items_tx.send_replace(self.items.clone());
        }
    }

    fn complete_one(&mut self) {
        self.outstanding = self.outstanding.saturating_sub(1);
        if self.outstanding == 0 {
            self.load_tx.send_replace(LoadState::Loaded);
        }
    }

    fn spawn_fetch<F, Fut>(&self, fetch: F)
    where
        F: FnOnce(Arc<dyn ArchiveClient>) -> Fut + Send + 'static,
        Fut: Future<Output = StoreMsg> + Send + 'static,
    {
        let Some(msg_tx) = self.msg_tx.upgrade() else {
            return;
        };
        let client = Arc::clone(&self.client);
        tokio::spawn(async move {
            let msg = fetch(client).await;
            let _ = msg_tx.send(msg);
        });
    }
}
