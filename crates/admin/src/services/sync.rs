//! Live mirror of the `products` and `orders` collections.
//!
//! One standing subscription per collection. Every snapshot replaces the
//! local list wholesale: products keep the store's order, orders are sorted
//! newest first and the pending counter is recomputed in the same write.
//! There is no merging and no optimistic update; whatever the store sent last
//! is what pages render.

use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, Weak};

use tokio::sync::watch;
use tracing::instrument;

use popeyon_core::{
    Order, OrderId, Product, ProductId, count_pending, sort_newest_first,
};

use crate::config::StoreConfig;
use crate::store::{DocumentStore, Snapshot, SnapshotHandler, StoreError, Subscription};

/// Local copy of both collections.
#[derive(Debug, Clone, Default)]
struct Mirror {
    products: Vec<Product>,
    orders: Vec<Order>,
    pending_count: usize,
    products_loaded: bool,
    orders_loaded: bool,
}

impl Mirror {
    /// Whether both collections have delivered their first snapshot.
    const fn is_loaded(&self) -> bool {
        self.products_loaded && self.orders_loaded
    }
}

struct SyncInner {
    mirror: RwLock<Mirror>,
    generation: watch::Sender<u64>,
    subscriptions: Mutex<Vec<Subscription>>,
}

/// Handle to the mirror. Cheap to clone.
///
/// Subscriptions are torn down when the last handle is dropped or
/// [`StoreSync::shutdown`] is called.
#[derive(Clone)]
pub struct StoreSync {
    inner: Arc<SyncInner>,
}

impl Default for StoreSync {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreSync {
    /// An empty mirror with no subscriptions.
    ///
    /// Used as-is when no store handle could be obtained.
    #[must_use]
    pub fn new() -> Self {
        let (generation, _) = watch::channel(0);
        Self {
            inner: Arc::new(SyncInner {
                mirror: RwLock::new(Mirror::default()),
                generation,
                subscriptions: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Subscribe to both collections of `config`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if either subscription cannot be opened.
    #[instrument(skip_all, fields(tenant = %config.tenant_id))]
    pub async fn start(store: &dyn DocumentStore, config: &StoreConfig) -> Result<Self, StoreError> {
        let sync = Self::new();
        let weak = Arc::downgrade(&sync.inner);

        let products = store
            .subscribe(&config.products(), handler(&weak, Self::apply_products))
            .await?;
        let orders = store
            .subscribe(&config.orders(), handler(&weak, Self::apply_orders))
            .await?;

        sync.subscriptions().extend([products, orders]);
        tracing::info!("Subscribed to products and orders");
        Ok(sync)
    }

    /// Cancel both subscriptions. The mirror keeps its last contents.
    pub async fn shutdown(&self) {
        let subscriptions = std::mem::take(&mut *self.subscriptions());
        for subscription in subscriptions {
            subscription.unsubscribe().await;
        }
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.subscriptions().iter().filter(|s| s.is_active()).count()
    }

    /// Replace the product list with `snapshot`.
    pub fn apply_products(&self, snapshot: &Snapshot) {
        let products: Vec<Product> = snapshot
            .documents()
            .iter()
            .filter_map(|doc| {
                Product::from_document(doc)
                    .inspect_err(|e| tracing::warn!(error = %e, "Skipping malformed product"))
                    .ok()
            })
            .collect();

        tracing::debug!(count = products.len(), "Product mirror replaced");
        self.write(|mirror| {
            mirror.products = products;
            mirror.products_loaded = true;
        });
    }

    /// Replace the order list with `snapshot`, newest first.
    pub fn apply_orders(&self, snapshot: &Snapshot) {
        let mut orders: Vec<Order> = snapshot
            .documents()
            .iter()
            .filter_map(|doc| {
                Order::from_document(doc)
                    .inspect_err(|e| tracing::warn!(error = %e, "Skipping malformed order"))
                    .ok()
            })
            .collect();
        sort_newest_first(&mut orders);
        let pending_count = count_pending(&orders);

        tracing::debug!(count = orders.len(), pending_count, "Order mirror replaced");
        self.write(|mirror| {
            mirror.orders = orders;
            mirror.pending_count = pending_count;
            mirror.orders_loaded = true;
        });
    }

    #[must_use]
    pub fn products(&self) -> Vec<Product> {
        self.read().products.clone()
    }

    #[must_use]
    pub fn product_count(&self) -> usize {
        self.read().products.len()
    }

    #[must_use]
    pub fn product(&self, id: &ProductId) -> Option<Product> {
        self.read().products.iter().find(|p| &p.id == id).cloned()
    }

    #[must_use]
    pub fn orders(&self) -> Vec<Order> {
        self.read().orders.clone()
    }

    #[must_use]
    pub fn order(&self, id: &OrderId) -> Option<Order> {
        self.read().orders.iter().find(|o| &o.id == id).cloned()
    }

    /// Orders currently `pending`.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.read().pending_count
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.read().is_loaded()
    }

    /// Number of mirror replacements so far.
    #[must_use]
    pub fn generation(&self) -> u64 {
        *self.inner.generation.borrow()
    }

    /// Wait until the mirror has been replaced past `generation`.
    pub async fn changed_since(&self, generation: u64) {
        let mut rx = self.inner.generation.subscribe();
        let _ = rx.wait_for(|current| *current > generation).await;
    }

    /// Wait until both collections have delivered a snapshot.
    pub async fn ready(&self) {
        let mut rx = self.inner.generation.subscribe();
        let _ = rx.wait_for(|_| self.is_loaded()).await;
    }

    fn read(&self) -> RwLockReadGuard<'_, Mirror> {
        self.inner
            .mirror
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self, update: impl FnOnce(&mut Mirror)) {
        {
            let mut mirror = self
                .inner
                .mirror
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            update(&mut mirror);
        }
        self.inner.generation.send_modify(|g| *g += 1);
    }

    fn subscriptions(&self) -> std::sync::MutexGuard<'_, Vec<Subscription>> {
        self.inner
            .subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Snapshot handler that applies to the mirror while it is still alive.
///
/// Holds a weak reference so a running feed never keeps the mirror (and
/// therefore its own subscription) alive.
fn handler(weak: &Weak<SyncInner>, apply: fn(&StoreSync, &Snapshot)) -> SnapshotHandler {
    let weak = weak.clone();
    Arc::new(move |snapshot: Snapshot| {
        if let Some(inner) = weak.upgrade() {
            apply(&StoreSync { inner }, &snapshot);
        }
    })
}
