//! The derived intervention status.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Where an intervention stands, as derived from the room timeline.
///
/// `None` means no recognized action has been folded yet.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum InterventionStatus {
  #[default]
  None,
  Solicitada,
  Autorizada,
  CancelamentoInformado,
  CienteDoCancelamento,
}

impl InterventionStatus {
  /// Human-readable label shown to participants; `None` has no label.
  pub fn label(self) -> Option<&'static str> {
    match self {
      Self::None => None,
      Self::Solicitada => Some("Solicitada"),
      Self::Autorizada => Some("Autorizada"),
      Self::CancelamentoInformado => Some("Cancelamento Informado"),
      Self::CienteDoCancelamento => Some("Ciente do Cancelamento"),
    }
  }

  pub fn is_terminal(self) -> bool { matches!(self, Self::CienteDoCancelamento) }
}
