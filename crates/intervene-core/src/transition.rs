//! The intervention transition table.
//!
//! Edges only move forward; `CienteDoCancelamento` has no outgoing edge.

use crate::{action::Action, role::Role, status::InterventionStatus};

/// A defined edge of the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
  pub from:          InterventionStatus,
  pub action:        Action,
  /// The only role allowed to take this edge.
  pub required_role: Role,
  pub to:            InterventionStatus,
}

pub const EDGES: [Edge; 5] = [
  Edge {
    from:          InterventionStatus::None,
    action:        Action::CreateIntervention,
    required_role: Role::FieldTeam,
    to:            InterventionStatus::Solicitada,
  },
  Edge {
    from:          InterventionStatus::Solicitada,
    action:        Action::AuthorizeIntervention,
    required_role: Role::Counterparty,
    to:            InterventionStatus::Autorizada,
  },
  Edge {
    from:          InterventionStatus::Solicitada,
    action:        Action::InformCancelation,
    required_role: Role::FieldTeam,
    to:            InterventionStatus::CancelamentoInformado,
  },
  Edge {
    from:          InterventionStatus::Autorizada,
    action:        Action::InformCancelation,
    required_role: Role::FieldTeam,
    to:            InterventionStatus::CancelamentoInformado,
  },
  Edge {
    from:          InterventionStatus::CancelamentoInformado,
    action:        Action::CheckCancelation,
    required_role: Role::Counterparty,
    to:            InterventionStatus::CienteDoCancelamento,
  },
];

/// Look up the edge for `(from, action)`, if one is defined.
pub fn edge(from: InterventionStatus, action: Action) -> Option<&'static Edge> {
  EDGES.iter().find(|e| e.from == from && e.action == action)
}
