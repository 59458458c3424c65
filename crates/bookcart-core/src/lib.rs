#![forbid(unsafe_code)]

//! bookcart core
//!
//! Domain state for the bookstore: the catalog, the persisted cart, the
//! derived cart view and the checkout flow, plus the two front-end models
//! that drive them.
//!
//! # Key Components
//!
//! - [`Catalog`] - Immutable, ordered list of purchasable items
//! - [`CartStore`] - Owner of the [`CartState`] identifier set, persisted under [`CART_KEY`]
//! - [`CartView`] - Items, total and count derived from cart and catalog
//! - [`FlowState`] - Browsing / cart / checkout state machine
//! - [`Storefront`] - The store front-end [`bookcart_runtime::Model`]
//! - [`ShelfApp`] - Editable, searchable book list front-end
//!
//! # How it fits in the system
//! Everything here is synchronous and single-owner. Persistence goes through
//! `bookcart_runtime::StateSlot`, so any `StorageBackend` works, and both
//! front-ends run under `Program` or `ProgramSimulator` unchanged.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod price;
pub mod shelf;
pub mod storefront;
pub mod view;

pub use cart::{CART_KEY, CartDecodeError, CartState, CartStore};
pub use catalog::{Catalog, CatalogError, Item, ItemId};
pub use checkout::{FlowAction, FlowEffect, FlowState, Transition};
pub use price::{Price, PriceError};
pub use shelf::{
    BookDraft, BookRecord, FormFields, PendingConfirm, SHELF_KEY, Shelf, ShelfApp, ShelfMsg,
    ValidationError,
};
pub use storefront::{ORDER_PLACED_NOTICE, OrderReceipt, ReceiptLine, StoreMsg, Storefront};
pub use view::{CartView, stale_ids};
