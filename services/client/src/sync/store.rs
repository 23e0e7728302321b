//! services/client/src/sync/store.rs
//!
//! The list cache shared by every mounted view.
//!
//! Each `EndpointKey` owns one entry. The remote collection is the source of
//! truth: entries are only ever filled from a fetch, and a mutation can only
//! mark them stale and trigger a refetch.

use futures::future::join_all;
use recletters_core::domain::Listing;
use recletters_core::endpoint::{EndpointKey, Scope};
use recletters_core::mutation::Affected;
use recletters_core::ports::{NotificationService, OperationalLog, RemoteCollectionService};
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListState {
    Idle,
    Loading,
    Ready,
    Failed,
}

/// What a view renders from: the state plus the last rows that arrived.
#[derive(Debug, Clone, PartialEq)]
pub struct ListSnapshot {
    pub state: ListState,
    pub listing: Option<Listing>,
    pub stale: bool,
}

impl ListSnapshot {
    fn idle() -> Self {
        Self {
            state: ListState::Idle,
            listing: None,
            stale: false,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.state == ListState::Loading
    }
}

#[derive(Debug)]
struct Entry {
    state: ListState,
    listing: Option<Listing>,
    /// Set by every fetch; a response is only applied if it still matches.
    generation: u64,
    subscribers: usize,
    stale: bool,
}

impl Default for Entry {
    fn default() -> Self {
        Self {
            state: ListState::Idle,
            listing: None,
            generation: 0,
            subscribers: 0,
            stale: false,
        }
    }
}

impl Entry {
    fn snapshot(&self) -> ListSnapshot {
        ListSnapshot {
            state: self.state,
            listing: self.listing.clone(),
            stale: self.stale,
        }
    }
}

pub struct QueryStore {
    remote: Arc<dyn RemoteCollectionService>,
    notifier: Arc<dyn NotificationService>,
    log: Arc<dyn OperationalLog>,
    entries: Mutex<HashMap<EndpointKey, Entry>>,
    /// Store-wide so generations stay unique across `clear`.
    generations: AtomicU64,
}

impl QueryStore {
    pub fn new(
        remote: Arc<dyn RemoteCollectionService>,
        notifier: Arc<dyn NotificationService>,
        log: Arc<dyn OperationalLog>,
    ) -> Arc<Self> {
        Arc::new(Self {
            remote,
            notifier,
            log,
            entries: Mutex::new(HashMap::new()),
            generations: AtomicU64::new(0),
        })
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<EndpointKey, Entry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn snapshot(&self, key: &EndpointKey) -> ListSnapshot {
        self.entries()
            .get(key)
            .map(Entry::snapshot)
            .unwrap_or_else(ListSnapshot::idle)
    }

    pub fn subscribers(&self, key: &EndpointKey) -> usize {
        self.entries().get(key).map_or(0, |e| e.subscribers)
    }

    /// Registers a mounted view on `key` and loads it.
    ///
    /// The view counts as mounted from the first poll on; if the returned
    /// future is dropped mid-fetch, the count is released with it.
    pub async fn mount(self: &Arc<Self>, key: EndpointKey) -> Subscription {
        let subscription = self.subscribe(key);
        self.fetch(key).await;
        subscription
    }

    /// Counts one more view on `key` and hands back the guard that undoes it.
    fn subscribe(self: &Arc<Self>, key: EndpointKey) -> Subscription {
        self.entries().entry(key).or_default().subscribers += 1;
        Subscription {
            store: Arc::clone(self),
            key,
        }
    }

    /// Reads `key` from the remote collection.
    ///
    /// If another fetch for the same key starts before this one resolves,
    /// this response is dropped on arrival.
    pub async fn fetch(&self, key: EndpointKey) -> ListSnapshot {
        let generation = self.generations.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut entries = self.entries();
            let entry = entries.entry(key).or_default();
            entry.generation = generation;
            entry.state = ListState::Loading;
        }

        let result = self.remote.fetch(&key).await;

        let failure = {
            let mut entries = self.entries();
            let Some(entry) = entries.get_mut(&key) else {
                debug!(%key, "Entry cleared while fetching, dropping response");
                return ListSnapshot::idle();
            };
            // A clear resets the generation to 0, which no fetch ever holds.
            if entry.generation != generation {
                debug!(%key, generation, current = entry.generation, "Dropping superseded response");
                return entry.snapshot();
            }
            match result {
                Ok(listing) => {
                    debug!(%key, rows = listing.len(), "Listing ready");
                    entry.listing = Some(listing);
                    entry.state = ListState::Ready;
                    entry.stale = false;
                    None
                }
                Err(err) => {
                    entry.state = ListState::Failed;
                    Some(err)
                }
            }
        };

        if let Some(err) = failure {
            let fallback = format!("Error communicating with backend via GET on {key}");
            self.notifier.notify(&err.user_message(&fallback));
            self.log.log_error(&err.to_string(), &key.to_string());
        }
        self.snapshot(&key)
    }

    /// Marks `keys` stale and refetches, once each, the ones a view is mounted
    /// on. Returns the number of refetches issued.
    pub async fn invalidate<I>(&self, keys: I) -> usize
    where
        I: IntoIterator<Item = EndpointKey>,
    {
        let keys: BTreeSet<EndpointKey> = keys.into_iter().collect();
        let mounted: Vec<EndpointKey> = {
            let mut entries = self.entries();
            keys.into_iter()
                .filter(|key| match entries.get_mut(key) {
                    Some(entry) => {
                        entry.stale = true;
                        entry.subscribers > 0
                    }
                    None => false,
                })
                .collect()
        };

        join_all(mounted.iter().map(|key| self.fetch(*key))).await;
        mounted.len()
    }

    /// Invalidates every key that may contain a record touched by a mutation.
    pub async fn invalidate_affected(&self, affected: Affected) -> usize {
        let keys: Vec<EndpointKey> = self
            .entries()
            .keys()
            .filter(|key| match affected.id {
                Some(id) => key.may_contain(affected.collection, id),
                // A new record can only show up in list views.
                None => {
                    key.collection == affected.collection
                        && !matches!(key.scope, Scope::Id(_))
                }
            })
            .copied()
            .collect();
        let refetched = self.invalidate(keys).await;
        info!(collection = ?affected.collection, id = ?affected.id, refetched, "Invalidated after mutation");
        refetched
    }

    /// Forgets every cached listing. Fetches still in flight are dropped on
    /// arrival.
    ///
    /// Entries with live subscriptions keep their subscriber count, so views
    /// mounted across the clear are still refetched and still release their
    /// own count when dropped.
    pub fn clear(&self) {
        let mut entries = self.entries();
        let mounted = entries.values().filter(|e| e.subscribers > 0).count();
        if mounted > 0 {
            warn!(mounted, "Clearing the store while views are still mounted");
        }
        entries.retain(|_, e| e.subscribers > 0);
        for entry in entries.values_mut() {
            *entry = Entry {
                subscribers: entry.subscribers,
                ..Entry::default()
            };
        }
    }

    fn unsubscribe(&self, key: &EndpointKey) {
        if let Some(entry) = self.entries().get_mut(key) {
            entry.subscribers = entry.subscribers.saturating_sub(1);
        }
    }
}

/// A mounted view's hold on a key. Dropping it unmounts the view.
pub struct Subscription {
    store: Arc<QueryStore>,
    key: EndpointKey,
}

impl Subscription {
    pub fn key(&self) -> EndpointKey {
        self.key
    }

    pub fn snapshot(&self) -> ListSnapshot {
        self.store.snapshot(&self.key)
    }

    /// Manual refresh.
    pub async fn refetch(&self) -> ListSnapshot {
        self.store.fetch(self.key).await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.store.unsubscribe(&self.key);
    }
}
