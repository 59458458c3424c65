#![forbid(unsafe_code)]

//! Derived cart view: what the cart holds, projected through the catalog.
//!
//! Nothing here is stored. A [`CartView`] borrows the catalog and is rebuilt
//! from the current [`CartState`] whenever it is needed.
//!
//! `count` is the size of the identifier set, not the number of projected
//! items. An identifier with no catalog entry still counts but contributes
//! no item and no money, so `count` can exceed `items.len()`.

use crate::cart::CartState;
use crate::catalog::{Catalog, Item, ItemId};
use crate::price::Price;

/// Projection of a cart over a catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct CartView<'a> {
    /// Selected items in catalog order.
    pub items: Vec<&'a Item>,
    /// Sum of `items` prices.
    pub total: Price,
    /// Size of the identifier set.
    pub count: usize,
}

impl<'a> CartView<'a> {
    /// Project `cart` over `catalog`.
    #[must_use]
    pub fn project(cart: &CartState, catalog: &'a Catalog) -> Self {
        let items: Vec<&'a Item> = catalog.iter().filter(|item| cart.contains(item.id)).collect();
        let total = items.iter().map(|item| item.price).sum();
        Self {
            items,
            total,
            count: cart.len(),
        }
    }

    /// Whether no item projects (stale identifiers alone leave this true).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether `id` is among the projected items.
    #[must_use]
    pub fn contains(&self, id: ItemId) -> bool {
        self.items.iter().any(|item| item.id == id)
    }
}

/// Identifiers in `cart` with no entry in `catalog`, ascending.
#[must_use]
pub fn stale_ids(cart: &CartState, catalog: &Catalog) -> Vec<ItemId> {
    cart.iter().filter(|id| !catalog.contains(*id)).collect()
}
