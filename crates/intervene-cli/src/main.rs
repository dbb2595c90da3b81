//! `intervene`: command-line client for the intervention server.
//!
//! # Usage
//!
//! ```
//! intervene --url http://localhost:8448 --user ana --password secret rooms
//! intervene --config ~/.config/intervene/config.toml status <room-id>
//! ```

mod client;
mod render;

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig, Conditional};
use intervene_core::action::Action;
use serde::Deserialize;
use strum::IntoEnumIterator as _;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "intervene", about = "Coordinate interventions from the terminal")]
struct Args {
  /// Path to a TOML config file (url, username, password).
  #[arg(short, long, value_name = "FILE")]
  config: Option<std::path::PathBuf>,

  /// Base URL of the intervene server (default: http://localhost:8448).
  #[arg(long, env = "INTERVENE_URL")]
  url: Option<String>,

  /// API username.
  #[arg(long, env = "INTERVENE_USER")]
  user: Option<String>,

  /// API password (plaintext).
  #[arg(long, env = "INTERVENE_PASSWORD")]
  password: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// List rooms.
  Rooms,
  /// Create a room.
  CreateRoom { name: String },
  /// Join a room. `--user-type cteep` joins as the field team.
  Join {
    room: Uuid,
    #[arg(long)]
    user_type: Option<String>,
  },
  /// List a room's members and their roles.
  Members { room: Uuid },
  /// Print the room timeline.
  Log {
    room: Uuid,
    /// Only events after this sequence number.
    #[arg(long)]
    after: Option<u64>,
  },
  /// Post a chat message.
  Send {
    room: Uuid,
    #[arg(required = true, num_args = 1..)]
    body: Vec<String>,
  },
  /// Show the current intervention status.
  Status { room: Uuid },
  /// Print the status whenever it changes.
  Watch {
    room: Uuid,
    /// Poll interval in seconds.
    #[arg(long, default_value_t = 5)]
    interval: u64,
  },
  /// List the room's action messages.
  Interventions { room: Uuid },
  /// Show the actions available to you right now.
  Controls { room: Uuid },
  /// Request a transition, e.g. `request <room> create_intervention -s SE1`.
  Request {
    room: Uuid,
    #[arg(value_parser = parse_action)]
    action: Action,
    /// Substation name; repeat for several.
    #[arg(short, long = "substation")]
    substations: Vec<String>,
  },
  /// List the predefined questions for an event's substations.
  Questions { room: Uuid, sequence: u64 },
  /// Send the `n`-th predefined question (1-based) for an event.
  Ask { room: Uuid, sequence: u64, n: usize },
}

fn parse_action(s: &str) -> Result<Action, String> {
  Action::from_tag(s).ok_or_else(|| {
    let known: Vec<_> = Action::iter().map(Action::tag).collect();
    format!("unknown action {s:?}; expected one of: {}", known.join(", "))
  })
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:      String,
  #[serde(default)]
  username: String,
  #[serde(default)]
  password: String,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url: args
      .url
      .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
      .unwrap_or_else(|| "http://localhost:8448".to_string()),
    username: args
      .user
      .or_else(|| (!file_cfg.username.is_empty()).then(|| file_cfg.username.clone()))
      .unwrap_or_default(),
    password: args
      .password
      .or_else(|| (!file_cfg.password.is_empty()).then(|| file_cfg.password.clone()))
      .unwrap_or_default(),
  };

  let client = ApiClient::new(api_config)?;
  run(&client, args.command).await
}

async fn run(client: &ApiClient, command: Command) -> Result<()> {
  match command {
    Command::Rooms => {
      for room in client.list_rooms().await? {
        println!("{}", render::room_line(&room));
      }
    }
    Command::CreateRoom { name } => {
      let room = client.create_room(&name).await?;
      println!("{}", render::room_line(&room));
    }
    Command::Join { room, user_type } => {
      let m = client.join(room, user_type.as_deref()).await?;
      println!("joined as {}", m.role);
    }
    Command::Members { room } => {
      for m in client.members(room).await? {
        println!("{}", render::member_line(&m));
      }
    }
    Command::Log { room, after } => {
      for e in client.events(room, after).await? {
        println!("{}", render::event_line(&e));
      }
    }
    Command::Send { room, body } => {
      let e = client.send_message(room, &body.join(" ")).await?;
      println!("{}", render::event_line(&e));
    }
    Command::Status { room } => {
      println!("{}", render::status_block(&client.status(room).await?));
    }
    Command::Watch { room, interval } => watch(client, room, interval).await?,
    Command::Interventions { room } => {
      for e in client.interventions(room).await? {
        println!("{}", render::event_line(&e));
      }
    }
    Command::Controls { room } => {
      println!("{}", render::controls_block(&client.controls(room).await?));
    }
    Command::Request { room, action, substations } => {
      let e = client.request_transition(room, action, &substations).await?;
      println!("{}", render::event_line(&e));
    }
    Command::Questions { room, sequence } => {
      for (i, q) in client.questions(room, sequence).await?.iter().enumerate() {
        println!("{:>2}. {q}", i + 1);
      }
    }
    Command::Ask { room, sequence, n } => {
      let questions = client.questions(room, sequence).await?;
      let question = n
        .checked_sub(1)
        .and_then(|i| questions.get(i))
        .ok_or_else(|| anyhow!("event #{sequence} has {} questions", questions.len()))?;
      let e = client.send_message(room, question).await?;
      println!("{}", render::event_line(&e));
    }
  }
  Ok(())
}

/// Poll the status with `If-None-Match`, printing each new version.
async fn watch(client: &ApiClient, room: Uuid, interval: u64) -> Result<()> {
  let mut etag: Option<String> = None;
  let mut ticker = tokio::time::interval(Duration::from_secs(interval.max(1)));
  loop {
    ticker.tick().await;
    match client.status_if_changed(room, etag.as_deref()).await? {
      Conditional::NotModified => {}
      Conditional::Modified { value, etag: next } => {
        println!("{}\n", render::status_block(&value));
        etag = next;
      }
    }
  }
}
