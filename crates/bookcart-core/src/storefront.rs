#![forbid(unsafe_code)]

//! The bookstore front-end model.
//!
//! [`Storefront`] wires the catalog, the [`CartStore`] and the checkout
//! [`FlowState`] together behind the runtime's [`Model`] trait. It is the
//! only place that reacts to user gestures; everything it delegates to is
//! either pure ([`CartView`], [`FlowState::apply`]) or owns its own state
//! ([`CartStore`]).

use crate::cart::CartStore;
use crate::catalog::{Catalog, ItemId};
use crate::checkout::{FlowAction, FlowEffect, FlowState};
use crate::price::Price;
use crate::view::CartView;
use bookcart_runtime::state_persistence::StorageBackend;
use bookcart_runtime::{Cmd, Event, Frame, Model};
use std::sync::Arc;
use tracing::{debug, info};

/// Notice shown once an order is placed.
pub const ORDER_PLACED_NOTICE: &str = "Order placed successfully! Thank you for your purchase.";

const HELP: &str = "\
commands:
  add ID        put a book in the cart
  remove ID     take a book out of the cart
  cart          open the cart
  close         close the cart
  checkout      go from the cart to checkout
  cancel        leave checkout, keeping the cart
  complete      place the order
  help          show this text
  quit          leave the store";

/// One line of a placed order.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptLine {
    /// Item ordered.
    pub id: ItemId,
    /// Title at the time of ordering.
    pub name: String,
    /// Price at the time of ordering.
    pub price: Price,
}

/// Snapshot of the cart taken when an order completes.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderReceipt {
    /// Ordered items in catalog order.
    pub lines: Vec<ReceiptLine>,
    /// Amount charged.
    pub total: Price,
    /// Identifier count at completion.
    pub count: usize,
}

impl OrderReceipt {
    fn from_view(view: &CartView<'_>) -> Self {
        Self {
            lines: view
                .items
                .iter()
                .map(|item| ReceiptLine {
                    id: item.id,
                    name: item.name.clone(),
                    price: item.price,
                })
                .collect(),
            total: view.total,
            count: view.count,
        }
    }
}

/// Messages understood by [`Storefront`].
#[derive(Debug, Clone, PartialEq)]
pub enum StoreMsg {
    /// Put an item in the cart.
    AddToCart(ItemId),
    /// Take an item out of the cart.
    RemoveFromCart(ItemId),
    /// Move the checkout flow.
    Flow(FlowAction),
    /// Print the command list.
    Help,
    /// Leave the store.
    Quit,
    /// Nothing to do (blank line, tick).
    Noop,
    /// Input that matched no command.
    Unknown(String),
}

impl StoreMsg {
    /// Parse one line of user input.
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Self::Noop;
        };
        let arg = words.next();
        let id = arg.and_then(|a| a.parse::<ItemId>().ok());

        match (command.to_ascii_lowercase().as_str(), id) {
            ("add" | "a", Some(id)) => Self::AddToCart(id),
            ("remove" | "rm" | "r", Some(id)) => Self::RemoveFromCart(id),
            ("cart" | "open", _) => Self::Flow(FlowAction::OpenCart),
            ("close", _) => Self::Flow(FlowAction::CloseCart),
            ("checkout", _) => Self::Flow(FlowAction::ProceedToCheckout),
            ("cancel", _) => Self::Flow(FlowAction::CancelCheckout),
            ("complete" | "order", _) => Self::Flow(FlowAction::CompleteOrder),
            ("help" | "?", _) => Self::Help,
            ("quit" | "q" | "exit", _) => Self::Quit,
            _ => Self::Unknown(line.trim().to_string()),
        }
    }
}

impl From<Event> for StoreMsg {
    fn from(event: Event) -> Self {
        match event {
            Event::Input(line) => Self::parse(&line),
            Event::Tick => Self::Noop,
        }
    }
}

/// The bookstore: catalog, cart and checkout flow.
#[derive(Debug)]
pub struct Storefront {
    catalog: Catalog,
    cart: CartStore,
    flow: FlowState,
    last_receipt: Option<OrderReceipt>,
}

impl Storefront {
    /// Build a storefront over an already-initialized cart.
    #[must_use]
    pub fn new(catalog: Catalog, cart: CartStore) -> Self {
        Self {
            catalog,
            cart,
            flow: FlowState::default(),
            last_receipt: None,
        }
    }

    /// Build a storefront, restoring the cart from `backend`.
    #[must_use]
    pub fn open(catalog: Catalog, backend: Arc<dyn StorageBackend>) -> Self {
        Self::new(catalog, CartStore::initialize(backend))
    }

    /// The catalog on sale.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The cart owner.
    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.cart
    }

    /// Current view state.
    #[must_use]
    pub fn flow(&self) -> FlowState {
        self.flow
    }

    /// Fresh projection of the cart.
    #[must_use]
    pub fn cart_view(&self) -> CartView<'_> {
        CartView::project(self.cart.state(), &self.catalog)
    }

    /// The most recently placed order, if any.
    #[must_use]
    pub fn last_receipt(&self) -> Option<&OrderReceipt> {
        self.last_receipt.as_ref()
    }

    fn add(&mut self, id: ItemId) -> Cmd<StoreMsg> {
        if !self.catalog.contains(id) {
            debug!(%id, "refusing unknown item");
            return Cmd::notify(format!("There is no book #{id}."));
        }
        self.cart.add(id);
        Cmd::none()
    }

    fn move_flow(&mut self, action: FlowAction) -> Cmd<StoreMsg> {
        if action == FlowAction::ProceedToCheckout
            && self.flow.is_cart_open()
            && self.cart_view().is_empty()
        {
            return Cmd::notify("Your cart is empty. Add some books to get started!");
        }

        let transition = self.flow.apply(action);
        debug!(from = %transition.from, to = %transition.to, ?action, "flow transition");
        self.flow = transition.to;

        match transition.effect {
            FlowEffect::None => Cmd::none(),
            FlowEffect::Ignored => Cmd::notify(format!("Nothing to {} here.", action_verb(action))),
            FlowEffect::OrderCompleted => {
                let receipt = OrderReceipt::from_view(&self.cart_view());
                info!(
                    items = receipt.lines.len(),
                    total = %receipt.total,
                    "order placed"
                );
                self.last_receipt = Some(receipt);
                self.cart.clear();
                Cmd::notify(ORDER_PLACED_NOTICE)
            }
        }
    }
}

fn action_verb(action: FlowAction) -> &'static str {
    match action {
        FlowAction::OpenCart => "open",
        FlowAction::CloseCart => "close",
        FlowAction::ProceedToCheckout => "check out",
        FlowAction::CancelCheckout => "cancel",
        FlowAction::CompleteOrder => "complete",
    }
}

impl Model for Storefront {
    type Message = StoreMsg;

    fn update(&mut self, msg: StoreMsg) -> Cmd<StoreMsg> {
        match msg {
            StoreMsg::AddToCart(id) => self.add(id),
            StoreMsg::RemoveFromCart(id) => {
                self.cart.remove(id);
                Cmd::none()
            }
            StoreMsg::Flow(action) => self.move_flow(action),
            StoreMsg::Help => Cmd::log(HELP),
            StoreMsg::Quit => Cmd::quit(),
            StoreMsg::Noop => Cmd::none(),
            StoreMsg::Unknown(text) => {
                Cmd::notify(format!("Unknown command {text:?}; type `help` for a list."))
            }
        }
    }

    fn view(&self, frame: &mut Frame) {
        let view = self.cart_view();

        let mut header = format!("BookStore | {} items in cart", view.count);
        if view.count > 0 {
            header.push_str(&format!(" | {}", view.total));
        }
        frame.line(header);
        frame.blank();

        for item in &self.catalog {
            let mark = if self.cart.contains(item.id) { "x" } else { " " };
            frame.line(format!(
                "[{mark}] #{:<3} {} by {}  {}",
                item.id, item.name, item.author, item.price
            ));
        }

        match self.flow {
            FlowState::Browsing => {}
            FlowState::CartOpen => {
                frame.blank();
                frame.line("Shopping Cart");
                if view.is_empty() {
                    frame.line("  Your cart is empty");
                    frame.line("  Add some books to get started!");
                } else {
                    for item in &view.items {
                        frame.line(format!("  #{:<3} {}  {}", item.id, item.name, item.price));
                    }
                    frame.line(format!("  Subtotal  {}", view.total));
                    frame.line("  Shipping  Free");
                    frame.line(format!("  Total     {}", view.total));
                    frame.line("  (checkout to proceed, close to return)");
                }
            }
            FlowState::Checkout => {
                frame.blank();
                frame.line("Checkout");
                frame.line("  Order Summary");
                for item in &view.items {
                    frame.line(format!("    {} by {}  {}", item.name, item.author, item.price));
                }
                frame.line(format!("  Total  {}", view.total));
                frame.line("  (complete to place the order, cancel to go back)");
            }
        }
    }
}
