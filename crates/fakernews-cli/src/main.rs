//! `fakernews`: command-line client for the fakernews API.
//!
//! # Usage
//!
//! ```text
//! fakernews --url http://localhost:3000 top stories
//! fakernews --user alice submit story --title "Show FN" --url https://example.com
//! fakernews item 42
//! fakernews --config ~/.config/fakernews/config.toml leaderboard snake
//! ```

mod client;
mod views;

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use client::{ApiClient, ApiConfig};
use fakernews_core::{
  game::{GameKind, Submit2048, SubmitFlappyBird, SubmitSnake},
  item::{ItemFlags, ItemId, ItemKind, NewItem},
  listing::{Listing, Page},
};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use views::Marks;

const DEFAULT_URL: &str = "http://localhost:3000";

// ─── CLI args ────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "fakernews", about = "Command-line client for fakernews")]
struct Args {
  /// Path to a TOML config file (url, user).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the fakernews server (default: http://localhost:3000).
  #[arg(long, env = "FAKERNEWS_URL")]
  url: Option<String>,

  /// User id to act as for votes, favorites and submissions.
  #[arg(long, env = "FAKERNEWS_USER")]
  user: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Show a ranked listing.
  Top {
    #[arg(value_enum, default_value = "stories")]
    listing: ListingArg,
    #[arg(long)]
    limit:   Option<i64>,
    #[arg(long)]
    offset:  Option<i64>,
  },
  /// Show an item with its full comment tree.
  Item { id: ItemId },
  /// Show a user's profile.
  User { id: String },
  /// List a user's items.
  Submissions {
    id:   String,
    #[arg(long = "type", value_enum)]
    kind: Option<KindArg>,
  },
  /// List a user's favorites (defaults to --user).
  Favorites { id: Option<String> },
  /// Register a new user id.
  Register {
    id:    String,
    #[arg(long)]
    about: Option<String>,
  },
  /// Submit a story or job as --user.
  Submit {
    #[arg(value_enum)]
    kind:  PostArg,
    #[arg(long, default_value = "")]
    url:   String,
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    text:  Option<String>,
  },
  /// Reply to an item as --user.
  Comment { parent: ItemId, text: String },
  /// Toggle your upvote on an item.
  Vote { id: ItemId },
  /// Toggle an item in your favorites.
  Favorite { id: ItemId },
  /// Delete an item and everything beneath it.
  Delete { id: ItemId },
  /// Set moderation flags on an item.
  Flag {
    id:      ItemId,
    #[arg(long)]
    dead:    Option<bool>,
    #[arg(long)]
    deleted: Option<bool>,
  },
  /// Adjust a user's karma by a signed delta.
  Karma {
    id:    String,
    #[arg(allow_hyphen_values = true)]
    delta: i64,
  },
  /// Record a game score as --user.
  #[command(subcommand)]
  Score(ScoreCommand),
  /// Show a user's best scores for a game (defaults to --user).
  Scores {
    #[arg(value_parser = parse_game)]
    game: GameKind,
    user: Option<String>,
  },
  /// Show the global leaderboard for a game.
  Leaderboard {
    #[arg(value_parser = parse_game)]
    game:  GameKind,
    #[arg(long)]
    limit: Option<i64>,
  },
}

#[derive(Subcommand, Debug)]
enum ScoreCommand {
  #[command(name = "2048")]
  Game2048 {
    score:     i64,
    #[arg(long)]
    best_tile: Option<i64>,
    #[arg(long)]
    moves:     Option<i64>,
  },
  Snake {
    score:      i64,
    #[arg(long)]
    duration:   i64,
    #[arg(long)]
    food_eaten: Option<i64>,
  },
  Flappybird {
    score:        i64,
    #[arg(long)]
    pipes_passed: i64,
    #[arg(long)]
    duration:     i64,
  },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ListingArg {
  Stories,
  Comments,
  Jobs,
  New,
}

impl From<ListingArg> for Listing {
  fn from(arg: ListingArg) -> Self {
    match arg {
      ListingArg::Stories => Listing::TopStories,
      ListingArg::Comments => Listing::TopComments,
      ListingArg::Jobs => Listing::TopJobs,
      ListingArg::New => Listing::NewStories,
    }
  }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum KindArg {
  Story,
  Comment,
  Job,
}

impl From<KindArg> for ItemKind {
  fn from(arg: KindArg) -> Self {
    match arg {
      KindArg::Story => ItemKind::Story,
      KindArg::Comment => ItemKind::Comment,
      KindArg::Job => ItemKind::Job,
    }
  }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PostArg {
  Story,
  Job,
}

fn parse_game(s: &str) -> Result<GameKind, String> {
  GameKind::parse(s).map_err(|e| e.to_string())
}

// ─── Config file ─────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:  String,
  #[serde(default)]
  user: String,
}

// ─── Entry point ─────────────────────────────────────────────────────────────

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

  // Load config file if provided.
  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let base_url = args
    .url
    .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
    .unwrap_or_else(|| DEFAULT_URL.to_string());
  let user = args
    .user
    .or_else(|| (!file_cfg.user.is_empty()).then(|| file_cfg.user.clone()));

  let client = ApiClient::new(ApiConfig { base_url })?;
  let out = run(&client, user.as_deref(), args.command).await?;
  print!("{out}");
  Ok(())
}

fn require_user(user: Option<&str>) -> Result<&str> {
  user
    .filter(|u| !u.trim().is_empty())
    .ok_or_else(|| anyhow!("this command needs --user (or FAKERNEWS_USER)"))
}

/// Execute one command and return the text to print.
async fn run(client: &ApiClient, user: Option<&str>, command: Command) -> Result<String> {
  let now = Utc::now();

  let text = match command {
    Command::Top { listing, limit, offset } => {
      let page = Page::new(limit, offset);
      let ids = client.top(listing.into(), page.limit, page.offset).await?;

      let mut items = Vec::with_capacity(ids.len());
      for id in &ids {
        if let Some(item) = client.get_item(*id).await? {
          items.push(item);
        }
      }

      let marks = match user {
        Some(user) if !ids.is_empty() => Marks {
          upvoted:   client.upvote_statuses(user, &ids).await?,
          favorited: client.favorite_statuses(user, &ids).await?,
        },
        _ => Marks::default(),
      };
      views::listing(&items, page.offset, &marks, now)
    }

    Command::Item { id } => {
      let items = client.get_thread(id).await?;
      if !items.contains_key(&id) {
        return Err(anyhow!("item {id} not found"));
      }
      views::thread(id, &items, now)
    }

    Command::User { id } => {
      let user = client
        .get_user(&id)
        .await?
        .ok_or_else(|| anyhow!("user {id} not found"))?;
      views::user(&user, now)
    }

    Command::Submissions { id, kind } => {
      let items = client.user_items(&id, kind.map(Into::into)).await?;
      views::summaries(&items, now)
    }

    Command::Favorites { id } => {
      let id = match id {
        Some(id) => id,
        None => require_user(user)?.to_owned(),
      };
      views::favorites(&client.user_favorites(&id).await?, now)
    }

    Command::Register { id, about } => {
      let user = client.create_user(&id, about.as_deref()).await?;
      format!("registered {}\n", user.id)
    }

    Command::Submit { kind, url, title, text } => {
      let by = require_user(user)?.to_owned();
      let item = match kind {
        PostArg::Story => NewItem::Story { by, url, title, text },
        PostArg::Job => NewItem::Job { by, url, title, text },
      };
      let created = client.create_item(&item).await?;
      format!("created #{}\n", created.id())
    }

    Command::Comment { parent, text } => {
      let item = NewItem::comment(require_user(user)?, parent, text);
      let created = client.create_item(&item).await?;
      format!("created #{}\n", created.id())
    }

    Command::Vote { id } => {
      let outcome = client.vote(id, require_user(user)?).await?;
      let verb = if outcome.upvoted { "upvoted" } else { "unvoted" };
      format!("{verb} #{} (score {})\n", outcome.id, outcome.score)
    }

    Command::Favorite { id } => {
      let outcome = client.favorite(id, require_user(user)?).await?;
      let verb = if outcome.favorited { "saved" } else { "removed" };
      format!("{verb} #{}\n", outcome.id)
    }

    Command::Delete { id } => {
      client.delete_item(id).await?;
      format!("deleted #{id}\n")
    }

    Command::Flag { id, dead, deleted } => {
      let item = client.set_flags(id, ItemFlags { deleted, dead }).await?;
      let mut items = std::collections::HashMap::new();
      items.insert(id, item);
      views::thread(id, &items, now)
    }

    Command::Karma { id, delta } => {
      let user = client.adjust_karma(&id, delta).await?;
      views::user(&user, now)
    }

    Command::Score(score) => {
      let user_id = require_user(user)?.to_owned();
      let row = match score {
        ScoreCommand::Game2048 { score, best_tile, moves } => {
          let body = Submit2048 { user_id, score, best_tile, moves };
          client.submit_score(GameKind::Game2048, &body).await?
        }
        ScoreCommand::Snake { score, duration, food_eaten } => {
          let body = SubmitSnake { user_id, score, duration, food_eaten };
          client.submit_score(GameKind::Snake, &body).await?
        }
        ScoreCommand::Flappybird { score, pipes_passed, duration } => {
          let body = SubmitFlappyBird { user_id, score, pipes_passed, duration };
          client.submit_score(GameKind::FlappyBird, &body).await?
        }
      };
      format!("recorded {} score {} (#{})\n", row.stats.kind().label(), row.score, row.id)
    }

    Command::Scores { game, user: who } => {
      let who = match who {
        Some(who) => who,
        None => require_user(user)?.to_owned(),
      };
      views::user_scores(&client.user_scores(game, &who).await?, now)
    }

    Command::Leaderboard { game, limit } => {
      let limit = Page::with_default(limit, None, 10).limit;
      views::leaderboard(game, &client.leaderboard(game, limit).await?)
    }
  };
  Ok(text)
}
