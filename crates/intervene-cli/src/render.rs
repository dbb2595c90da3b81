//! Plain-text rendering of API responses.

use chrono::Local;
use intervene_core::{
  controls::Control,
  timeline::{Membership, Room, TimelineEvent},
};

use crate::client::{ControlsView, StatusView};

pub fn room_line(r: &Room) -> String { format!("{}  {}", r.room_id, r.name) }

pub fn member_line(m: &Membership) -> String {
  match &m.user_type {
    Some(t) => format!("{:<16} {} ({t})", m.user_id, m.role),
    None => format!("{:<16} {}", m.user_id, m.role),
  }
}

/// `#<seq> <time> <sender>: <body>`, with the action tag and substations
/// appended for workflow messages.
pub fn event_line(e: &TimelineEvent) -> String {
  let at = e.recorded_at.with_timezone(&Local).format("%Y-%m-%d %H:%M");
  let mut line = format!("#{} {at} {}: {}", e.sequence, e.sender, e.content.body);
  if let Some(tag) = &e.content.action {
    line.push_str(&format!("  [{tag}"));
    if !e.content.substations.is_empty() {
      line.push_str(&format!(" {}", e.content.substations.join(", ")));
    }
    line.push(']');
  }
  line
}

pub fn status_block(s: &StatusView) -> String {
  let mut out = format!("status: {}", s.label.as_deref().unwrap_or("-"));
  if !s.substations.is_empty() {
    out.push_str(&format!("\nsubstations: {}", s.substations.join(", ")));
  }
  if let Some(seq) = s.transition_sequence {
    out.push_str(&format!("\nlast transition: #{seq}"));
  }
  if let Some(seq) = s.last_sequence {
    out.push_str(&format!("\nevents read: {seq}"));
  }
  out
}

pub fn control_line(c: &Control) -> String {
  let mark = if c.enabled { "x" } else { " " };
  format!("[{mark}] {:<24} {}", c.action.tag(), c.label)
}

pub fn controls_block(v: &ControlsView) -> String {
  let header = format!("{} at {}", v.role, v.status);
  if v.controls.is_empty() {
    return format!("{header}: no controls");
  }
  let lines: Vec<_> = v.controls.iter().map(control_line).collect();
  format!("{header}\n{}", lines.join("\n"))
}
