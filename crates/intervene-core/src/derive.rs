//! The state deriver: a total, single-pass fold over the room timeline.
//!
//! Nothing here can fail. Events that do not move the state machine
//! (ordinary chat, unknown tags, undefined edges, wrong roles, replays) are
//! skipped and reported as a [`Step`] for logging only.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
  action::Action, content::clean_substations, role::Role,
  status::InterventionStatus, transition,
};

// ─── Input ───────────────────────────────────────────────────────────────────

/// One timeline event as seen by the deriver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionMessage {
  /// Position in the room timeline; strictly increasing per room.
  pub sequence:    u64,
  /// `None` for ordinary chat messages and unrecognized tags.
  pub action:      Option<Action>,
  pub substations: Vec<String>,
  /// Resolved from the sender's room membership.
  pub sender_role: Role,
}

// ─── Output ──────────────────────────────────────────────────────────────────

/// The deriver's register. Never stored as truth; always recomputable from
/// the timeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Derivation {
  pub status:              InterventionStatus,
  /// Substations of the active workflow instance, fixed by its
  /// `create_intervention` message.
  pub substations:         Vec<String>,
  /// Highest sequence folded so far, ordinary messages included.
  pub last_sequence:       Option<u64>,
  /// Sequence of the message that produced `status`.
  pub transition_sequence: Option<u64>,
}

/// What a single [`Derivation::apply`] did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
  /// The sequence was not past `last_sequence`; a duplicate or replay.
  Stale,
  /// No recognized action tag.
  Untagged,
  /// `(status, action)` is not an edge of the table.
  NoEdge,
  /// The edge exists but the sender does not hold its required role.
  WrongRole,
  /// A `create_intervention` with no non-blank substations.
  Malformed,
  /// The status moved to the given target.
  Advanced(InterventionStatus),
}

impl Derivation {
  /// Fold one event into the register.
  pub fn apply(&mut self, msg: &ActionMessage) -> Step {
    if self.last_sequence.is_some_and(|last| msg.sequence <= last) {
      return Step::Stale;
    }
    self.last_sequence = Some(msg.sequence);

    let Some(action) = msg.action else {
      return Step::Untagged;
    };
    let Some(edge) = transition::edge(self.status, action) else {
      return Step::NoEdge;
    };
    if edge.required_role != msg.sender_role {
      return Step::WrongRole;
    }
    if action == Action::CreateIntervention {
      let substations = clean_substations(&msg.substations);
      if substations.is_empty() {
        return Step::Malformed;
      }
      self.substations = substations;
    }

    self.status = edge.to;
    self.transition_sequence = Some(msg.sequence);
    Step::Advanced(edge.to)
  }

  /// Continue the fold from this register over further events.
  pub fn fold<'a, I>(mut self, events: I) -> Self
  where
    I: IntoIterator<Item = &'a ActionMessage>,
  {
    for msg in events {
      match self.apply(msg) {
        Step::Advanced(to) => {
          debug!(sequence = msg.sequence, status = %to, "intervention advanced")
        }
        Step::Untagged | Step::Stale => {}
        skipped => debug!(
          sequence = msg.sequence,
          action = ?msg.action,
          role = %msg.sender_role,
          status = %self.status,
          ?skipped,
          "action message has no effect"
        ),
      }
    }
    self
  }
}

/// Derive the intervention state of a room from its ordered events.
pub fn derive_status<'a, I>(events: I) -> Derivation
where
  I: IntoIterator<Item = &'a ActionMessage>,
{
  Derivation::default().fold(events)
}

#[cfg(test)]
mod tests {
  use strum::IntoEnumIterator as _;

  use super::*;

  fn msg(sequence: u64, action: Action, sender_role: Role) -> ActionMessage {
    ActionMessage {
      sequence,
      action: Some(action),
      substations: if action == Action::CreateIntervention {
        vec!["SE1".into()]
      } else {
        Vec::new()
      },
      sender_role,
    }
  }

  fn chat(sequence: u64) -> ActionMessage {
    ActionMessage {
      sequence,
      action: None,
      substations: Vec::new(),
      sender_role: Role::Counterparty,
    }
  }

  fn happy_path() -> Vec<ActionMessage> {
    vec![
      msg(1, Action::CreateIntervention, Role::FieldTeam),
      msg(2, Action::AuthorizeIntervention, Role::Counterparty),
      msg(3, Action::InformCancelation, Role::FieldTeam),
      msg(4, Action::CheckCancelation, Role::Counterparty),
    ]
  }

  /// Every event a deriver can see: each action from each role, plus chat.
  fn alphabet() -> Vec<(Option<Action>, Role)> {
    let mut out = vec![(None, Role::FieldTeam)];
    for action in Action::iter() {
      for role in [Role::FieldTeam, Role::Counterparty, Role::Unknown] {
        out.push((Some(action), role));
      }
    }
    out
  }

  fn sequences(len: usize) -> Vec<Vec<ActionMessage>> {
    let letters = alphabet();
    let mut out: Vec<Vec<ActionMessage>> = vec![Vec::new()];
    for position in 0..len {
      out = out
        .into_iter()
        .flat_map(|prefix| {
          letters.iter().map(move |(action, role)| {
            let mut next = prefix.clone();
            next.push(ActionMessage {
              sequence:    position as u64 + 1,
              action:      *action,
              substations: vec!["SE1".into()],
              sender_role: *role,
            });
            next
          })
        })
        .collect();
    }
    out
  }

  #[test]
  fn empty_log_is_none() {
    let d = derive_status(&[] as &[ActionMessage]);
    assert_eq!(d.status, InterventionStatus::None);
    assert!(d.substations.is_empty());
    assert_eq!(d.last_sequence, None);
  }

  #[test]
  fn happy_path_walks_every_state() {
    let events = happy_path();
    let expected = [
      InterventionStatus::Solicitada,
      InterventionStatus::Autorizada,
      InterventionStatus::CancelamentoInformado,
      InterventionStatus::CienteDoCancelamento,
    ];
    for (n, want) in expected.into_iter().enumerate() {
      assert_eq!(derive_status(&events[..=n]).status, want);
    }
  }

  #[test]
  fn cancel_before_authorization() {
    let events = vec![
      msg(1, Action::CreateIntervention, Role::FieldTeam),
      msg(2, Action::InformCancelation, Role::FieldTeam),
      msg(3, Action::AuthorizeIntervention, Role::Counterparty),
    ];
    let d = derive_status(&events);
    assert_eq!(d.status, InterventionStatus::CancelamentoInformado);
    assert_eq!(d.transition_sequence, Some(2));
  }

  #[test]
  fn out_of_order_action_is_a_no_op() {
    let create = msg(1, Action::CreateIntervention, Role::FieldTeam);
    let check = msg(2, Action::CheckCancelation, Role::Counterparty);
    let a = derive_status([&create]);
    let b = derive_status([&create, &check]);
    assert_eq!(a.status, b.status);
    assert_eq!(a.substations, b.substations);
    assert_eq!(a.transition_sequence, b.transition_sequence);
  }

  #[test]
  fn wrong_role_does_not_advance() {
    let mut d = Derivation::default();
    let step = d.apply(&msg(1, Action::CreateIntervention, Role::Counterparty));
    assert_eq!(step, Step::WrongRole);
    assert_eq!(d.status, InterventionStatus::None);

    let step = d.apply(&msg(2, Action::CreateIntervention, Role::Unknown));
    assert_eq!(step, Step::WrongRole);

    let step = d.apply(&msg(3, Action::CreateIntervention, Role::FieldTeam));
    assert_eq!(step, Step::Advanced(InterventionStatus::Solicitada));
  }

  #[test]
  fn create_without_substations_is_malformed() {
    let mut d = Derivation::default();
    let mut create = msg(1, Action::CreateIntervention, Role::FieldTeam);
    create.substations.clear();
    assert_eq!(d.apply(&create), Step::Malformed);
    assert_eq!(d.status, InterventionStatus::None);
  }

  #[test]
  fn create_with_blank_substations_is_malformed() {
    let mut d = Derivation::default();
    let mut create = msg(1, Action::CreateIntervention, Role::FieldTeam);
    create.substations = vec![" ".into(), String::new()];
    assert_eq!(d.apply(&create), Step::Malformed);
    assert_eq!(d.status, InterventionStatus::None);
    assert!(d.substations.is_empty());
  }

  #[test]
  fn create_substations_are_cleaned_like_the_governor() {
    let mut create = msg(1, Action::CreateIntervention, Role::FieldTeam);
    create.substations = vec![" SE1 ".into(), "".into(), "SE1".into(), "SE2".into()];
    let d = derive_status([&create]);
    assert_eq!(d.status, InterventionStatus::Solicitada);
    assert_eq!(d.substations, vec!["SE1", "SE2"]);
  }

  #[test]
  fn substations_come_from_the_create_message() {
    let mut create = msg(1, Action::CreateIntervention, Role::FieldTeam);
    create.substations = vec!["SE Bauru".into(), "SE Jupiá".into()];
    let mut authorize = msg(2, Action::AuthorizeIntervention, Role::Counterparty);
    authorize.substations = vec!["ignored".into()];

    let d = derive_status([&create, &authorize]);
    assert_eq!(d.substations, vec!["SE Bauru", "SE Jupiá"]);
  }

  #[test]
  fn chat_messages_advance_only_last_sequence() {
    let events = vec![
      chat(1),
      msg(2, Action::CreateIntervention, Role::FieldTeam),
      chat(3),
    ];
    let d = derive_status(&events);
    assert_eq!(d.status, InterventionStatus::Solicitada);
    assert_eq!(d.last_sequence, Some(3));
    assert_eq!(d.transition_sequence, Some(2));
  }

  #[test]
  fn replayed_events_are_stale() {
    let mut d = derive_status(&happy_path()[..2]);
    let replay = msg(1, Action::CreateIntervention, Role::FieldTeam);
    assert_eq!(d.apply(&replay), Step::Stale);
    assert_eq!(d.status, InterventionStatus::Autorizada);
  }

  #[test]
  fn post_terminal_create_is_a_no_op() {
    let mut events = happy_path();
    let mut again = msg(5, Action::CreateIntervention, Role::FieldTeam);
    again.substations = vec!["SE2".into()];
    events.push(again);

    let d = derive_status(&events);
    assert_eq!(d.status, InterventionStatus::CienteDoCancelamento);
    assert_eq!(d.substations, vec!["SE1"]);
  }

  #[test]
  fn racing_authorizations_resolve_to_authorized() {
    let create = msg(1, Action::CreateIntervention, Role::FieldTeam);
    let first = msg(2, Action::AuthorizeIntervention, Role::Counterparty);
    let second = msg(3, Action::AuthorizeIntervention, Role::Counterparty);

    let d = derive_status([&create, &first, &second]);
    assert_eq!(d.status, InterventionStatus::Autorizada);
    assert_eq!(d.transition_sequence, Some(2));
  }

  #[test]
  fn racing_authorize_and_cancel_follow_timeline_order() {
    let create = msg(1, Action::CreateIntervention, Role::FieldTeam);

    let authorize_first = [
      create.clone(),
      msg(2, Action::AuthorizeIntervention, Role::Counterparty),
      msg(3, Action::InformCancelation, Role::FieldTeam),
    ];
    let cancel_first = [
      create,
      msg(2, Action::InformCancelation, Role::FieldTeam),
      msg(3, Action::AuthorizeIntervention, Role::Counterparty),
    ];

    assert_eq!(
      derive_status(&authorize_first).status,
      InterventionStatus::CancelamentoInformado
    );
    let d = derive_status(&cancel_first);
    assert_eq!(d.status, InterventionStatus::CancelamentoInformado);
    assert_eq!(d.transition_sequence, Some(2));
  }

  #[test]
  fn derivation_is_deterministic() {
    for events in sequences(3) {
      assert_eq!(derive_status(&events), derive_status(&events));
    }
  }

  #[test]
  fn prefix_extension_is_consistent() {
    for events in sequences(3) {
      let whole = derive_status(&events);
      for split in 0..=events.len() {
        let (head, tail) = events.split_at(split);
        assert_eq!(derive_status(head).fold(tail), whole, "split at {split}");
      }
    }
  }

  #[test]
  fn status_never_moves_backwards() {
    let rank = |s: InterventionStatus| {
      InterventionStatus::iter().position(|x| x == s).unwrap()
    };
    for events in sequences(3) {
      let mut d = Derivation::default();
      for m in &events {
        let before = rank(d.status);
        d.apply(m);
        assert!(rank(d.status) >= before);
      }
    }
  }
}
