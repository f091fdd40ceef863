//! Plain-text rendering of API responses.
//!
//! Every function here is pure: it takes already-fetched data plus the
//! current time and returns the text to print.

use std::{
  collections::{BTreeMap, HashMap},
  fmt::Write as _,
};

use chrono::{DateTime, Utc};
use fakernews_core::{
  game::{GameKind, GameScore, GameStats, Leaderboard, UserScores},
  item::{FavoriteSummary, ItemId, ItemSummary, ItemView, LiveItem},
  user::User,
};

/// Per-item markers for the current user.
#[derive(Debug, Default)]
pub struct Marks {
  pub upvoted:   BTreeMap<ItemId, bool>,
  pub favorited: BTreeMap<ItemId, bool>,
}

impl Marks {
  fn prefix(&self, id: ItemId) -> String {
    let up = if self.upvoted.get(&id).copied().unwrap_or(false) { '▲' } else { ' ' };
    let fav = if self.favorited.get(&id).copied().unwrap_or(false) { '★' } else { ' ' };
    format!("{up}{fav}")
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// "3 hours ago" style relative time.
pub fn age(time: DateTime<Utc>, now: DateTime<Utc>) -> String {
  let secs = (now - time).num_seconds().max(0);
  let (n, unit) = match secs {
    0..60 => return "just now".into(),
    60..3_600 => (secs / 60, "minute"),
    3_600..86_400 => (secs / 3_600, "hour"),
    _ => (secs / 86_400, "day"),
  };
  let plural = if n == 1 { "" } else { "s" };
  format!("{n} {unit}{plural} ago")
}

fn domain(url: &str) -> Option<String> {
  let parsed = reqwest::Url::parse(url).ok()?;
  let host = parsed.host_str()?;
  Some(host.strip_prefix("www.").unwrap_or(host).to_owned())
}

fn first_line(text: &str, max: usize) -> String {
  let line = text.lines().next().unwrap_or_default();
  if line.chars().count() > max {
    let cut: String = line.chars().take(max.saturating_sub(1)).collect();
    format!("{cut}…")
  } else {
    line.to_owned()
  }
}

fn headline(title: Option<&str>, url: &str) -> String {
  let title = title.unwrap_or(if url.is_empty() { "(untitled)" } else { url });
  match domain(url) {
    Some(d) => format!("{title} ({d})"),
    None => title.to_owned(),
  }
}

// ─── Listings ────────────────────────────────────────────────────────────────

/// A front-page style listing; ranks start at `offset + 1`.
pub fn listing(
  items: &[ItemView],
  offset: u32,
  marks: &Marks,
  now: DateTime<Utc>,
) -> String {
  if items.is_empty() {
    return "nothing here yet\n".into();
  }

  let mut out = String::new();
  for (n, item) in items.iter().enumerate() {
    let rank = offset as usize + n + 1;
    let mark = marks.prefix(item.id());
    let (head, meta) = match item {
      ItemView::Deleted(_) => ("[deleted]".to_owned(), String::new()),
      ItemView::Live(LiveItem::Story(s)) => (
        headline(s.title.as_deref(), &s.url),
        format!(
          "{} points by {} {} | {} replies",
          s.score,
          s.by,
          age(s.time, now),
          item.kids().len()
        ),
      ),
      ItemView::Live(LiveItem::Job(j)) => (
        headline(j.title.as_deref(), &j.url),
        format!("posted {}", age(j.time, now)),
      ),
      ItemView::Live(LiveItem::Comment(c)) => (
        first_line(&c.text, 60),
        format!(
          "{} points by {} {} | on #{}",
          c.score,
          c.by,
          age(c.time, now),
          c.parent
        ),
      ),
    };
    let _ = writeln!(out, "{rank:>3}.{mark} {head}  [#{}]", item.id());
    if !meta.is_empty() {
      let _ = writeln!(out, "        {meta}");
    }
  }
  out
}

// ─── Threads ─────────────────────────────────────────────────────────────────

/// Depth-first order of the thread under `root`, as `(depth, id)` pairs.
/// Ids missing from `items` are skipped along with their subtrees.
pub fn thread_order(root: ItemId, items: &HashMap<ItemId, ItemView>) -> Vec<(usize, ItemId)> {
  let mut order = Vec::new();
  let mut stack = vec![(0, root)];

  while let Some((depth, id)) = stack.pop() {
    let Some(item) = items.get(&id) else { continue };
    order.push((depth, id));
    // Reverse so the lowest id is visited first.
    stack.extend(item.kids().iter().rev().map(|kid| (depth + 1, *kid)));
  }
  order
}

/// An item page: the root item followed by its indented comment tree.
pub fn thread(
  root: ItemId,
  items: &HashMap<ItemId, ItemView>,
  now: DateTime<Utc>,
) -> String {
  let mut out = String::new();

  for (depth, id) in thread_order(root, items) {
    let Some(item) = items.get(&id) else { continue };
    let indent = "  ".repeat(depth);

    match item {
      ItemView::Deleted(_) => {
        let _ = writeln!(out, "{indent}[deleted]");
      }
      ItemView::Live(LiveItem::Comment(c)) => {
        let dead = if c.dead { " [dead]" } else { "" };
        let _ = writeln!(
          out,
          "{indent}{} ({} points) {}{dead}  [#{}]",
          c.by,
          c.score,
          age(c.time, now),
          c.id
        );
        for line in c.text.lines() {
          let _ = writeln!(out, "{indent}  {line}");
        }
      }
      ItemView::Live(LiveItem::Story(s)) => {
        let _ = writeln!(out, "{}  [#{}]", headline(s.title.as_deref(), &s.url), s.id);
        if !s.url.is_empty() {
          let _ = writeln!(out, "{}", s.url);
        }
        let _ = writeln!(
          out,
          "{} points by {} {}{}",
          s.score,
          s.by,
          age(s.time, now),
          if s.dead { " [dead]" } else { "" }
        );
        if let Some(text) = &s.text {
          let _ = writeln!(out, "\n{text}");
        }
        let _ = writeln!(out);
      }
      ItemView::Live(LiveItem::Job(j)) => {
        let _ = writeln!(out, "{}  [#{}]", headline(j.title.as_deref(), &j.url), j.id);
        let _ = writeln!(out, "{}\nposted {}", j.url, age(j.time, now));
        if let Some(text) = &j.text {
          let _ = writeln!(out, "\n{text}");
        }
      }
    }
  }
  out
}

// ─── Users ───────────────────────────────────────────────────────────────────

pub fn user(user: &User, now: DateTime<Utc>) -> String {
  let mut out = String::new();
  let _ = writeln!(out, "user:    {}", user.id);
  let _ = writeln!(out, "created: {}", age(user.created, now));
  let _ = writeln!(out, "karma:   {}", user.karma);
  if let Some(about) = &user.about {
    let _ = writeln!(out, "about:   {about}");
  }
  out
}

fn summary_line(item: &ItemSummary, now: DateTime<Utc>) -> String {
  let head = match (&item.title, &item.text) {
    (Some(title), _) => title.clone(),
    (None, Some(text)) => first_line(text, 60),
    (None, None) => item.url.clone().unwrap_or_default(),
  };
  format!(
    "[#{}] {:<7} {head} ({} points, {})",
    item.id,
    item.kind,
    item.score,
    age(item.time, now)
  )
}

pub fn summaries(items: &[ItemSummary], now: DateTime<Utc>) -> String {
  if items.is_empty() {
    return "no items\n".into();
  }
  items
    .iter()
    .map(|i| summary_line(i, now) + "\n")
    .collect()
}

pub fn favorites(items: &[FavoriteSummary], now: DateTime<Utc>) -> String {
  if items.is_empty() {
    return "no favorites\n".into();
  }
  items
    .iter()
    .map(|f| {
      format!(
        "{}  (saved {})\n",
        summary_line(&f.item, now),
        age(f.favorited_at, now)
      )
    })
    .collect()
}

// ─── Games ───────────────────────────────────────────────────────────────────

fn stats(stats: &GameStats) -> String {
  match stats {
    GameStats::Game2048 { best_tile, moves } => {
      format!("best tile {best_tile}, {moves} moves")
    }
    GameStats::Snake { duration, food_eaten } => {
      format!("{food_eaten} food in {duration}s")
    }
    GameStats::FlappyBird { pipes_passed, duration } => {
      format!("{pipes_passed} pipes in {duration}s")
    }
  }
}

pub fn leaderboard(game: GameKind, board: &Leaderboard) -> String {
  let mut out = format!("{} leaderboard\n", game.label());
  if board.scores.is_empty() {
    out.push_str("no scores yet\n");
    return out;
  }
  for (n, entry) in board.scores.iter().enumerate() {
    let _ = writeln!(
      out,
      "{:>3}. {:<16} {:>8}  {}",
      n + 1,
      entry.user.id,
      entry.score.score,
      stats(&entry.score.stats)
    );
  }
  out
}

pub fn user_scores(scores: &UserScores, now: DateTime<Utc>) -> String {
  if let Some(message) = &scores.message {
    return format!("{message}\n");
  }
  scores
    .scores
    .iter()
    .map(|s: &GameScore| {
      format!("{:>8}  {}  ({})\n", s.score, stats(&s.stats), age(s.time, now))
    })
    .collect()
}
