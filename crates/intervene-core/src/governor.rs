//! The transition governor. Decides whether a caller may take an action
//! and composes the tagged message if so.
//!
//! Checks run against the caller's view of the timeline, which may be
//! stale. Two callers can both pass and both submit; the fold in
//! [`crate::derive`] settles the race by timeline order, turning the later
//! message into a no-op.

use crate::{
  action::Action,
  content::{MessageContent, clean_substations},
  derive::Derivation,
  error::TransitionError,
  role::Role,
  status::InterventionStatus,
  transition::{self, Edge},
};

/// Check that `role` may take `action` from `status`.
pub fn permit(
  status: InterventionStatus,
  role: Role,
  action: Action,
) -> Result<&'static Edge, TransitionError> {
  let edge = transition::edge(status, action)
    .ok_or(TransitionError::InvalidTransition { status, action })?;
  if edge.required_role != role {
    return Err(TransitionError::Unauthorized {
      action,
      required: edge.required_role,
      actual: role,
    });
  }
  Ok(edge)
}

/// Validate a transition request and compose the message that carries it.
///
/// `substations` is only read for `create_intervention`; every later action
/// carries the substations of the active instance.
pub fn request_transition(
  current: &Derivation,
  role: Role,
  action: Action,
  substations: &[String],
) -> Result<MessageContent, TransitionError> {
  permit(current.status, role, action)?;

  let substations = if action == Action::CreateIntervention {
    let cleaned = clean_substations(substations);
    if cleaned.is_empty() {
      return Err(TransitionError::MissingSubstations);
    }
    cleaned
  } else {
    current.substations.clone()
  };

  Ok(MessageContent::tagged(action, substations))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn at(status: InterventionStatus) -> Derivation {
    Derivation {
      status,
      substations: vec!["SE1".into()],
      ..Default::default()
    }
  }

  fn se(ids: &[&str]) -> Vec<String> { ids.iter().map(|s| s.to_string()).collect() }

  #[test]
  fn field_team_may_create() {
    let content = request_transition(
      &Derivation::default(),
      Role::FieldTeam,
      Action::CreateIntervention,
      &se(&["SE1"]),
    )
    .unwrap();
    assert_eq!(content.action(), Some(Action::CreateIntervention));
    assert_eq!(content.substations, vec!["SE1"]);
  }

  #[test]
  fn counterparty_may_not_create() {
    let err = request_transition(
      &Derivation::default(),
      Role::Counterparty,
      Action::CreateIntervention,
      &se(&["SE1"]),
    )
    .unwrap_err();
    assert_eq!(
      err,
      TransitionError::Unauthorized {
        action:   Action::CreateIntervention,
        required: Role::FieldTeam,
        actual:   Role::Counterparty,
      }
    );
  }

  #[test]
  fn create_needs_substations() {
    let err = request_transition(
      &Derivation::default(),
      Role::FieldTeam,
      Action::CreateIntervention,
      &[],
    )
    .unwrap_err();
    assert_eq!(err, TransitionError::MissingSubstations);

    let err = request_transition(
      &Derivation::default(),
      Role::FieldTeam,
      Action::CreateIntervention,
      &se(&["  ", ""]),
    )
    .unwrap_err();
    assert_eq!(err, TransitionError::MissingSubstations);
  }

  #[test]
  fn substations_are_cleaned() {
    let content = request_transition(
      &Derivation::default(),
      Role::FieldTeam,
      Action::CreateIntervention,
      &se(&[" SE2 ", "SE1", "SE2", ""]),
    )
    .unwrap();
    assert_eq!(content.substations, vec!["SE2", "SE1"]);
  }

  #[test]
  fn undefined_edge_is_invalid() {
    let err = request_transition(
      &Derivation::default(),
      Role::Counterparty,
      Action::CheckCancelation,
      &[],
    )
    .unwrap_err();
    assert_eq!(
      err,
      TransitionError::InvalidTransition {
        status: InterventionStatus::None,
        action: Action::CheckCancelation,
      }
    );
  }

  #[test]
  fn edge_is_checked_before_role() {
    let err = permit(
      InterventionStatus::CienteDoCancelamento,
      Role::Unknown,
      Action::InformCancelation,
    )
    .unwrap_err();
    assert!(matches!(err, TransitionError::InvalidTransition { .. }));
  }

  #[test]
  fn later_actions_carry_instance_substations() {
    let content = request_transition(
      &at(InterventionStatus::Solicitada),
      Role::Counterparty,
      Action::AuthorizeIntervention,
      &se(&["SE9"]),
    )
    .unwrap();
    assert_eq!(content.substations, vec!["SE1"]);
    assert_eq!(content.body, "Autorizamos início da intervenção");
  }

  #[test]
  fn unknown_role_is_never_authorized() {
    let err = permit(
      InterventionStatus::Solicitada,
      Role::Unknown,
      Action::AuthorizeIntervention,
    )
    .unwrap_err();
    assert!(matches!(err, TransitionError::Unauthorized { .. }));
  }
}
