//! The action controls offered to a participant.
//!
//! Each role sees two controls, enabled only where the transition table
//! allows the action from the current status. This is a UX courtesy; the
//! governor re-checks every request and peers can post any tag anyway.

use serde::{Deserialize, Serialize};

use crate::{
  action::Action, governor, role::Role, status::InterventionStatus,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Control {
  pub action:  Action,
  pub label:   String,
  pub enabled: bool,
}

fn offered(role: Role) -> &'static [(Action, &'static str)] {
  match role {
    Role::FieldTeam => &[
      (Action::CreateIntervention, "Request to start"),
      (Action::InformCancelation, "Inform Cancelation"),
    ],
    Role::Counterparty => &[
      (Action::AuthorizeIntervention, "Authorize to start"),
      (Action::CheckCancelation, "Check Cancelation"),
    ],
    Role::Unknown => &[],
  }
}

/// The controls `role` sees while the intervention is at `status`.
pub fn controls(status: InterventionStatus, role: Role) -> Vec<Control> {
  offered(role)
    .iter()
    .map(|&(action, label)| Control {
      action,
      label: label.to_owned(),
      enabled: governor::permit(status, role, action).is_ok(),
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn enabled(status: InterventionStatus, role: Role) -> Vec<Action> {
    controls(status, role)
      .into_iter()
      .filter(|c| c.enabled)
      .map(|c| c.action)
      .collect()
  }

  #[test]
  fn field_team_panel() {
    use InterventionStatus::*;
    assert_eq!(enabled(None, Role::FieldTeam), [Action::CreateIntervention]);
    assert_eq!(enabled(Solicitada, Role::FieldTeam), [Action::InformCancelation]);
    assert_eq!(enabled(Autorizada, Role::FieldTeam), [Action::InformCancelation]);
    assert!(enabled(CancelamentoInformado, Role::FieldTeam).is_empty());
    assert!(enabled(CienteDoCancelamento, Role::FieldTeam).is_empty());
  }

  #[test]
  fn counterparty_panel() {
    use InterventionStatus::*;
    assert!(enabled(None, Role::Counterparty).is_empty());
    assert_eq!(
      enabled(Solicitada, Role::Counterparty),
      [Action::AuthorizeIntervention]
    );
    assert!(enabled(Autorizada, Role::Counterparty).is_empty());
    assert_eq!(
      enabled(CancelamentoInformado, Role::Counterparty),
      [Action::CheckCancelation]
    );
    assert!(enabled(CienteDoCancelamento, Role::Counterparty).is_empty());
  }

  #[test]
  fn labels_follow_role() {
    let labels: Vec<_> = controls(InterventionStatus::None, Role::Counterparty)
      .into_iter()
      .map(|c| c.label)
      .collect();
    assert_eq!(labels, ["Authorize to start", "Check Cancelation"]);
  }

  #[test]
  fn unknown_role_sees_nothing() {
    assert!(controls(InterventionStatus::Solicitada, Role::Unknown).is_empty());
  }
}
