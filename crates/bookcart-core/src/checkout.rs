#![forbid(unsafe_code)]

//! Checkout flow state machine.
//!
//! The flow decides which view is shown over the cart: the catalog alone,
//! the cart panel, or the checkout form. It never touches the cart itself;
//! completing an order is reported as [`FlowEffect::OrderCompleted`] and the
//! caller clears the cart.
//!
//! ```text
//!            OpenCart                ProceedToCheckout
//! Browsing ───────────▶ CartOpen ─────────────────────▶ Checkout
//!    ▲  ◀──────────────────┘                             │   │
//!    │       CloseCart                    CancelCheckout │   │ CompleteOrder
//!    └───────────────────────────────────────────────────┘   │ (OrderCompleted)
//!    └───────────────────────────────────────────────────────┘
//! ```
//!
//! Any action not listed for the current state is ignored and leaves the
//! state unchanged.

use std::fmt;

/// Which view is active.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FlowState {
    /// Catalog only.
    #[default]
    Browsing,
    /// Cart panel over the catalog.
    CartOpen,
    /// Checkout form.
    Checkout,
}

/// User gestures that move the flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowAction {
    /// Open the cart panel.
    OpenCart,
    /// Close the cart panel.
    CloseCart,
    /// Leave the cart panel for the checkout form.
    ProceedToCheckout,
    /// Close the checkout form, keeping the cart.
    CancelCheckout,
    /// Place the order.
    CompleteOrder,
}

/// Side effect the caller must carry out after a transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlowEffect {
    /// The action moved the flow and needs nothing else.
    None,
    /// The action does not apply in the current state.
    Ignored,
    /// The order was placed: clear the cart and confirm to the user.
    OrderCompleted,
}

/// Result of applying an action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    /// State before the action.
    pub from: FlowState,
    /// State after the action.
    pub to: FlowState,
    /// What the caller must do.
    pub effect: FlowEffect,
}

impl Transition {
    /// Whether the action was ignored.
    #[must_use]
    pub fn is_ignored(&self) -> bool {
        self.effect == FlowEffect::Ignored
    }
}

impl FlowState {
    /// Apply `action`, returning the next state and any required effect.
    #[must_use]
    pub fn apply(self, action: FlowAction) -> Transition {
        use FlowAction as A;
        use FlowState as S;

        let (to, effect) = match (self, action) {
            (S::Browsing, A::OpenCart) => (S::CartOpen, FlowEffect::None),
            (S::CartOpen, A::CloseCart) => (S::Browsing, FlowEffect::None),
            (S::CartOpen, A::ProceedToCheckout) => (S::Checkout, FlowEffect::None),
            (S::Checkout, A::CancelCheckout) => (S::Browsing, FlowEffect::None),
            (S::Checkout, A::CompleteOrder) => (S::Browsing, FlowEffect::OrderCompleted),
            (state, _) => (state, FlowEffect::Ignored),
        };
        Transition {
            from: self,
            to,
            effect,
        }
    }

    /// Whether the cart panel is showing.
    #[must_use]
    pub fn is_cart_open(self) -> bool {
        self == FlowState::CartOpen
    }

    /// Whether the checkout form is showing.
    #[must_use]
    pub fn is_checkout(self) -> bool {
        self == FlowState::Checkout
    }
}

impl fmt::Display for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FlowState::Browsing => "browsing",
            FlowState::CartOpen => "cart",
            FlowState::Checkout => "checkout",
        };
        f.write_str(name)
    }
}
