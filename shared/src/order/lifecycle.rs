//! Order status lifecycle
//!
//! ```text
//! pendiente ──► en_preparacion ──► listo ──► entregado
//!     │               │              │
//!     └───────────────┴──────────────┴──────► cancelado
//! ```
//!
//! `entregado` 与 `cancelado` 为终态，终态之后没有任何操作。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pendiente,
    EnPreparacion,
    Listo,
    Entregado,
    Cancelado,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        Self::Pendiente,
        Self::EnPreparacion,
        Self::Listo,
        Self::Entregado,
        Self::Cancelado,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pendiente => "pendiente",
            Self::EnPreparacion => "en_preparacion",
            Self::Listo => "listo",
            Self::Entregado => "entregado",
            Self::Cancelado => "cancelado",
        }
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pendiente => "Pendiente",
            Self::EnPreparacion => "En Preparación",
            Self::Listo => "Listo",
            Self::Entregado => "Entregado",
            Self::Cancelado => "Cancelado",
        }
    }

    /// Forward step, `None` for `listo → entregado` 之后以及终态
    pub fn next(&self) -> Option<OrderStatus> {
        match self {
            Self::Pendiente => Some(Self::EnPreparacion),
            Self::EnPreparacion => Some(Self::Listo),
            Self::Listo => Some(Self::Entregado),
            Self::Entregado | Self::Cancelado => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Entregado | Self::Cancelado)
    }

    pub fn can_transition_to(&self, target: OrderStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        target == Self::Cancelado || self.next() == Some(target)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown order status: {s}"))
    }
}

/// A status change offered to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusAction {
    pub target: OrderStatus,
    pub label: String,
}

impl StatusAction {
    fn new(target: OrderStatus) -> Self {
        let label = match target {
            OrderStatus::EnPreparacion => "Iniciar Preparación",
            OrderStatus::Listo => "Marcar Listo",
            OrderStatus::Entregado => "Entregar",
            OrderStatus::Cancelado => "Cancelar",
            OrderStatus::Pendiente => "Pendiente",
        };
        Self {
            target,
            label: label.to_string(),
        }
    }
}

/// Actions available to `role` for an order in `status`
///
/// 顾客无任何操作；员工在非终态下可前进一步（如有）或取消。
pub fn available_actions(role: Role, status: OrderStatus) -> Vec<StatusAction> {
    if !role.is_staff() || status.is_terminal() {
        return Vec::new();
    }

    let mut actions = Vec::with_capacity(2);
    if let Some(next) = status.next() {
        actions.push(StatusAction::new(next));
    }
    actions.push(StatusAction::new(OrderStatus::Cancelado));
    actions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn targets(role: Role, status: OrderStatus) -> Vec<OrderStatus> {
        available_actions(role, status)
            .into_iter()
            .map(|a| a.target)
            .collect()
    }

    #[test]
    fn test_forward_chain() {
        assert_eq!(OrderStatus::Pendiente.next(), Some(OrderStatus::EnPreparacion));
        assert_eq!(OrderStatus::EnPreparacion.next(), Some(OrderStatus::Listo));
        assert_eq!(OrderStatus::Listo.next(), Some(OrderStatus::Entregado));
        assert_eq!(OrderStatus::Entregado.next(), None);
        assert_eq!(OrderStatus::Cancelado.next(), None);
    }

    #[test]
    fn test_terminal_states_have_no_actions() {
        for role in [Role::Cliente, Role::Mesero, Role::Admin] {
            assert!(available_actions(role, OrderStatus::Entregado).is_empty());
            assert!(available_actions(role, OrderStatus::Cancelado).is_empty());
        }
    }

    #[test]
    fn test_cliente_has_no_actions() {
        for status in OrderStatus::ALL {
            assert!(available_actions(Role::Cliente, status).is_empty());
        }
    }

    #[test]
    fn test_staff_actions_on_listo() {
        let actions = available_actions(Role::Mesero, OrderStatus::Listo);
        assert_eq!(
            actions,
            vec![
                StatusAction {
                    target: OrderStatus::Entregado,
                    label: "Entregar".to_string()
                },
                StatusAction {
                    target: OrderStatus::Cancelado,
                    label: "Cancelar".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_staff_actions_on_pendiente() {
        assert_eq!(
            targets(Role::Admin, OrderStatus::Pendiente),
            vec![OrderStatus::EnPreparacion, OrderStatus::Cancelado]
        );
        assert_eq!(
            available_actions(Role::Admin, OrderStatus::Pendiente)[0].label,
            "Iniciar Preparación"
        );
    }

    #[test]
    fn test_transition_rules() {
        use OrderStatus::*;
        assert!(Pendiente.can_transition_to(EnPreparacion));
        assert!(Pendiente.can_transition_to(Cancelado));
        assert!(Listo.can_transition_to(Entregado));
        assert!(EnPreparacion.can_transition_to(Cancelado));

        // 不可跳步、不可回退、终态不可再变
        assert!(!Pendiente.can_transition_to(Listo));
        assert!(!Listo.can_transition_to(Pendiente));
        assert!(!Entregado.can_transition_to(Cancelado));
        assert!(!Cancelado.can_transition_to(Pendiente));
        assert!(!Pendiente.can_transition_to(Pendiente));
    }

    #[test]
    fn test_actions_match_transition_rules() {
        for status in OrderStatus::ALL {
            for action in available_actions(Role::Admin, status) {
                assert!(status.can_transition_to(action.target));
            }
        }
    }

    #[test]
    fn test_parse_and_labels() {
        assert_eq!(
            "en_preparacion".parse::<OrderStatus>().unwrap(),
            OrderStatus::EnPreparacion
        );
        assert!("preparing".parse::<OrderStatus>().is_err());
        assert_eq!(OrderStatus::EnPreparacion.label(), "En Preparación");
        assert_eq!(
            serde_json::to_value(OrderStatus::EnPreparacion).unwrap(),
            serde_json::json!("en_preparacion")
        );
    }
}
