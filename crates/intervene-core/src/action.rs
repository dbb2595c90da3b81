//! The closed vocabulary of workflow action tags.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// A workflow transition request carried as a tag on a text message.
///
/// The string form (`create_intervention`, ...) is what travels in the
/// `action` field of [`MessageContent`](crate::content::MessageContent).
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumIter,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Action {
  /// The field team asks for authorization to start.
  CreateIntervention,
  /// The counterparty authorizes the start.
  AuthorizeIntervention,
  /// The field team informs that the intervention was cancelled.
  InformCancelation,
  /// The counterparty acknowledges the cancellation.
  CheckCancelation,
}

impl Action {
  /// Parse an action tag as found on the wire. Unknown tags yield `None`
  /// so that newer clients' actions are skipped rather than rejected.
  pub fn from_tag(tag: &str) -> Option<Self> { tag.parse().ok() }

  /// The tag string stored in the message `action` field.
  pub fn tag(self) -> &'static str { self.into() }

  /// Fixed message body sent alongside the tag.
  pub fn body(self) -> &'static str {
    match self {
      Self::CreateIntervention => {
        "Solicitamos autorização para iniciar a intervenção"
      }
      Self::AuthorizeIntervention => "Autorizamos início da intervenção",
      Self::InformCancelation => "Informamos que a intervenção foi cancelada",
      Self::CheckCancelation => "Estamos cientes do cancelamento",
    }
  }
}
