//! Cart session: the current cart, its persistence, and change notifications.
//!
//! Every mutation goes through the pure [`Cart`] operations and the result is
//! written back under [`CART_STORAGE_KEY`]. When the storage fails (at
//! startup or on any later write) the session keeps working in memory and
//! stops persisting.
//!
//! Subscribers get a fresh [`CartSummary`] after each effective change.

use std::sync::Arc;

use bosanoga_core::{AddToCart, Cart, CartError, CartLine, CartSummary, ProductId};
use tokio::sync::{Mutex, MutexGuard, watch};

use crate::storage::KeyValueStorage;

/// Storage key the cart is persisted under.
pub const CART_STORAGE_KEY: &str = "bosa-noga-cart";

/// The cart owned by one client.
pub struct CartSession {
    cart: Cart,
    storage: Option<Arc<dyn KeyValueStorage>>,
    updates: watch::Sender<CartSummary>,
}

impl std::fmt::Debug for CartSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartSession")
            .field("cart", &self.cart)
            .field("persistent", &self.is_persistent())
            .finish_non_exhaustive()
    }
}

impl CartSession {
    /// Restore the cart from `storage`.
    ///
    /// Unusable persisted data yields an empty cart. Malformed lines are
    /// dropped and counted; counts above the maximum are clamped. A repaired
    /// cart is written back at once. If the storage cannot be used at all the
    /// session runs in memory.
    pub fn initialize(storage: Arc<dyn KeyValueStorage>) -> Self {
        if let Err(e) = storage.probe() {
            tracing::warn!(error = %e, "Cart storage unavailable, keeping the cart in memory");
            return Self::in_memory();
        }

        let (cart, repaired) = match storage.get(CART_STORAGE_KEY) {
            Ok(Some(raw)) => {
                let (cart, dropped) = Cart::from_persisted(&raw);
                if dropped > 0 {
                    tracing::warn!(dropped, "Discarded malformed persisted cart lines");
                }
                let repaired = dropped > 0 || cart.to_json().is_ok_and(|clean| clean != raw);
                (cart, repaired)
            }
            Ok(None) => (Cart::new(), false),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read persisted cart, starting empty");
                (Cart::new(), false)
            }
        };

        tracing::debug!(lines = cart.line_count(), repaired, "Cart restored");
        let mut session = Self::with_cart(cart, Some(storage));
        if repaired {
            session.persist();
        }
        session
    }

    /// A session that never persists.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::with_cart(Cart::new(), None)
    }

    fn with_cart(cart: Cart, storage: Option<Arc<dyn KeyValueStorage>>) -> Self {
        let (updates, _) = watch::channel(cart.summary());
        Self {
            cart,
            storage,
            updates,
        }
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    #[must_use]
    pub fn summary(&self) -> CartSummary {
        self.cart.summary()
    }

    /// Whether changes are still being written to storage.
    #[must_use]
    pub const fn is_persistent(&self) -> bool {
        self.storage.is_some()
    }

    /// Receive a summary after every change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartSummary> {
        self.updates.subscribe()
    }

    /// Add a product line, merging with an existing line of the same key.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Validation` and leaves the cart unchanged when the
    /// line or the quantity is invalid.
    pub fn add(&mut self, item: AddToCart) -> Result<&Cart, CartError> {
        let next = self.cart.add(item)?;
        self.commit(next);
        Ok(&self.cart)
    }

    pub fn remove(&mut self, id: ProductId, size: &str) -> &Cart {
        let next = self.cart.remove(id, size);
        self.commit(next);
        &self.cart
    }

    /// Set a line's quantity. Zero or below removes the line.
    pub fn update_quantity(&mut self, id: ProductId, size: &str, count: i64) -> &Cart {
        let next = self.cart.update_quantity(id, size, count);
        self.commit(next);
        &self.cart
    }

    pub fn adjust(&mut self, id: ProductId, size: &str, delta: i64) -> &Cart {
        let next = self.cart.adjust(id, size, delta);
        self.commit(next);
        &self.cart
    }

    pub fn clear(&mut self) -> &Cart {
        let next = self.cart.clear();
        self.commit(next);
        &self.cart
    }

    /// Take the quantities of a submitted order out of the cart.
    ///
    /// Lines not in `submitted` stay, and so does any quantity added to a
    /// submitted line after the snapshot was taken.
    pub fn remove_lines(&mut self, submitted: &[CartLine]) -> &Cart {
        let next = self.cart.without_submitted(submitted);
        self.commit(next);
        &self.cart
    }

    fn commit(&mut self, next: Cart) {
        if next == self.cart {
            return;
        }
        self.cart = next;
        self.persist();
        self.updates.send_replace(self.cart.summary());
    }

    fn persist(&mut self) {
        let Some(storage) = &self.storage else {
            return;
        };

        let result = match self.cart.to_json() {
            Ok(raw) => storage.set(CART_STORAGE_KEY, &raw),
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize cart");
                return;
            }
        };

        if let Err(e) = result {
            tracing::warn!(error = %e, "Failed to persist cart, keeping it in memory from now on");
            self.storage = None;
        }
    }
}

// =============================================================================
// Shared handle
// =============================================================================

/// A cart session shared between tasks.
#[derive(Clone)]
pub struct SharedCart {
    session: Arc<Mutex<CartSession>>,
    updates: watch::Receiver<CartSummary>,
}

impl SharedCart {
    #[must_use]
    pub fn new(session: CartSession) -> Self {
        let updates = session.subscribe();
        Self {
            session: Arc::new(Mutex::new(session)),
            updates,
        }
    }

    /// Lock the session for a sequence of operations.
    pub async fn lock(&self) -> MutexGuard<'_, CartSession> {
        self.session.lock().await
    }

    /// Run `f` against the session under the lock.
    pub async fn update<R>(&self, f: impl FnOnce(&mut CartSession) -> R) -> R {
        let mut session = self.session.lock().await;
        f(&mut session)
    }

    /// Copy of the current cart.
    pub async fn snapshot(&self) -> Cart {
        self.session.lock().await.cart().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartSummary> {
        self.updates.clone()
    }
}
