//! The message-content schema carried by every timeline event.
//!
//! Action tags and substations ride along a plain text message as extra
//! fields. The action is kept as a raw string so that tags this build does
//! not know survive storage untouched.

use serde::{Deserialize, Serialize};

use crate::action::Action;

/// `msgtype` of a plain text message.
pub const MSGTYPE_TEXT: &str = "m.text";

fn default_msgtype() -> String { MSGTYPE_TEXT.to_owned() }

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageContent {
  #[serde(default = "default_msgtype")]
  pub msgtype:     String,
  pub body:        String,
  /// Workflow action tag; absent on ordinary chat messages.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub action:      Option<String>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub substations: Vec<String>,
}

impl MessageContent {
  /// An ordinary text message with no action tag.
  pub fn text(body: impl Into<String>) -> Self {
    Self {
      msgtype:     default_msgtype(),
      body:        body.into(),
      action:      None,
      substations: Vec::new(),
    }
  }

  /// A text message tagged with `action`, using the action's fixed body.
  pub fn tagged(action: Action, substations: Vec<String>) -> Self {
    Self {
      msgtype: default_msgtype(),
      body: action.body().to_owned(),
      action: Some(action.tag().to_owned()),
      substations,
    }
  }

  /// The recognized action tag, if any. Unknown tags read as `None`.
  pub fn action(&self) -> Option<Action> {
    self.action.as_deref().and_then(Action::from_tag)
  }
}

/// Trim identifiers and drop blanks and repeats, keeping first-seen order.
pub(crate) fn clean_substations(raw: &[String]) -> Vec<String> {
  let mut out: Vec<String> = Vec::with_capacity(raw.len());
  for s in raw {
    let s = s.trim();
    if !s.is_empty() && !out.iter().any(|seen| seen == s) {
      out.push(s.to_owned());
    }
  }
  out
}
