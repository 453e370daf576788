//! Order lifecycle.
//!
//! An order moves forward through a fixed sequence and never back:
//!
//! ```text
//! pending ──ship──▶ shipped ──complete──▶ completed
//! ```
//!
//! The legal moves live in [`TRANSITIONS`]. Every status write is checked
//! against that table before it reaches the store, independent of which
//! buttons a page happens to render.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Order fulfillment status.
///
/// Serialized in lowercase. The legacy Spanish values written by the
/// customer-facing shop are accepted when reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    #[serde(alias = "pendiente")]
    Pending,
    #[serde(alias = "enviado")]
    Shipped,
    #[serde(alias = "completado")]
    Completed,
}

/// Every legal `(from, to)` status change. Anything not listed is rejected.
pub const TRANSITIONS: &[(OrderStatus, OrderStatus)] = &[
    (OrderStatus::Pending, OrderStatus::Shipped),
    (OrderStatus::Shipped, OrderStatus::Completed),
];

/// A status change that the lifecycle does not allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot move order from {from} to {to}")]
pub struct TransitionError {
    pub from: OrderStatus,
    pub to: OrderStatus,
}

impl OrderStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [Self; 3] = [Self::Pending, Self::Shipped, Self::Completed];

    /// Wire value written to the store.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Shipped => "shipped",
            Self::Completed => "completed",
        }
    }

    /// Whether moving from `self` to `to` is listed in [`TRANSITIONS`].
    #[must_use]
    pub fn can_transition_to(self, to: Self) -> bool {
        TRANSITIONS.contains(&(self, to))
    }

    /// Validate a move to `to`, returning the new status.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError` if the move is not in [`TRANSITIONS`].
    pub fn transition_to(self, to: Self) -> Result<Self, TransitionError> {
        if self.can_transition_to(to) {
            Ok(to)
        } else {
            Err(TransitionError { from: self, to })
        }
    }

    /// The single forward step from this status, if any.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        TRANSITIONS
            .iter()
            .find(|(from, _)| *from == self)
            .map(|&(_, to)| to)
    }

    /// Whether no further transition exists.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }

    /// Actions offered to the admin for an order in this status.
    #[must_use]
    pub const fn actions(self) -> &'static [OrderAction] {
        match self {
            Self::Pending => &[OrderAction::MarkShipped],
            Self::Shipped => &[OrderAction::MarkCompleted],
            Self::Completed => &[],
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" | "pendiente" => Ok(Self::Pending),
            "shipped" | "enviado" => Ok(Self::Shipped),
            "completed" | "completado" => Ok(Self::Completed),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// An admin action that advances an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderAction {
    MarkShipped,
    MarkCompleted,
}

impl OrderAction {
    /// Status the order moves to when the action is taken.
    #[must_use]
    pub const fn target(self) -> OrderStatus {
        match self {
            Self::MarkShipped => OrderStatus::Shipped,
            Self::MarkCompleted => OrderStatus::Completed,
        }
    }

    /// Button label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::MarkShipped => "Mark as shipped",
            Self::MarkCompleted => "Mark as completed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actions_per_status() {
        assert_eq!(OrderStatus::Pending.actions(), &[OrderAction::MarkShipped]);
        assert_eq!(
            OrderStatus::Shipped.actions(),
            &[OrderAction::MarkCompleted]
        );
        assert!(OrderStatus::Completed.actions().is_empty());
    }

    #[test]
    fn test_actions_agree_with_transition_table() {
        for status in OrderStatus::ALL {
            for action in status.actions() {
                assert!(status.can_transition_to(action.target()));
            }
        }
    }

    #[test]
    fn test_forward_transitions_allowed() {
        assert_eq!(
            OrderStatus::Pending.transition_to(OrderStatus::Shipped),
            Ok(OrderStatus::Shipped)
        );
        assert_eq!(
            OrderStatus::Shipped.transition_to(OrderStatus::Completed),
            Ok(OrderStatus::Completed)
        );
    }

    #[test]
    fn test_illegal_transitions_rejected() {
        let illegal = [
            (OrderStatus::Pending, OrderStatus::Completed),
            (OrderStatus::Pending, OrderStatus::Pending),
            (OrderStatus::Shipped, OrderStatus::Pending),
            (OrderStatus::Completed, OrderStatus::Pending),
            (OrderStatus::Completed, OrderStatus::Shipped),
            (OrderStatus::Completed, OrderStatus::Completed),
        ];
        for (from, to) in illegal {
            assert_eq!(from.transition_to(to), Err(TransitionError { from, to }));
        }
    }

    #[test]
    fn test_next_and_terminal() {
        assert_eq!(OrderStatus::Pending.next(), Some(OrderStatus::Shipped));
        assert_eq!(OrderStatus::Shipped.next(), Some(OrderStatus::Completed));
        assert_eq!(OrderStatus::Completed.next(), None);
        assert!(OrderStatus::Completed.is_terminal());
        assert!(!OrderStatus::Pending.is_terminal());
    }

    #[test]
    fn test_serde_accepts_legacy_values() {
        let status: OrderStatus = serde_json::from_str("\"enviado\"").unwrap();
        assert_eq!(status, OrderStatus::Shipped);
        assert_eq!(
            serde_json::to_string(&OrderStatus::Shipped).unwrap(),
            "\"shipped\""
        );
        assert!(serde_json::from_str::<OrderStatus>("\"cancelled\"").is_err());
    }

    #[test]
    fn test_from_str() {
        assert_eq!("completed".parse::<OrderStatus>(), Ok(OrderStatus::Completed));
        assert_eq!("pendiente".parse::<OrderStatus>(), Ok(OrderStatus::Pending));
        assert!("returned".parse::<OrderStatus>().is_err());
    }
}
