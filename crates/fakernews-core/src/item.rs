//! Items: stories, comments and job postings.
//!
//! Items form a tree through `parent`. The stored row ([`Item`]) is never sent
//! over the wire as-is; readers receive an [`ItemView`], which is either a
//! type-specific projection or a tombstone for deleted items.

use chrono::{DateTime, Utc, serde::ts_milliseconds};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::{Error, Result};

/// Store-assigned item identifier.
pub type ItemId = i64;

// ─── Kind ────────────────────────────────────────────────────────────────────

/// The discriminant stored in the `type` column.
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
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ItemKind {
  Story,
  Comment,
  Job,
}

// ─── Stored row ──────────────────────────────────────────────────────────────

/// A full row of the `items` table.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
  pub id:      ItemId,
  pub kind:    ItemKind,
  pub by:      String,
  pub time:    DateTime<Utc>,
  pub text:    Option<String>,
  pub url:     Option<String>,
  pub title:   Option<String>,
  pub parent:  Option<ItemId>,
  pub score:   i64,
  pub deleted: bool,
  pub dead:    bool,
}

impl Item {
  /// Project this row for readers. `kids` are the ids of direct children;
  /// an empty list is omitted from the projection.
  pub fn into_view(self, kids: Vec<ItemId>) -> ItemView {
    if self.deleted {
      return ItemView::Deleted(Tombstone {
        kind:    self.kind,
        id:      self.id,
        deleted: true,
      });
    }

    let kids = (!kids.is_empty()).then_some(kids);

    // The schema's CHECK constraints guarantee the per-kind required columns.
    let live = match self.kind {
      ItemKind::Comment => LiveItem::Comment(CommentView {
        id: self.id,
        by: self.by,
        time: self.time,
        dead: self.dead,
        score: self.score,
        text: self.text.unwrap_or_default(),
        parent: self.parent.unwrap_or_default(),
        kids,
      }),
      ItemKind::Story => LiveItem::Story(StoryView {
        id: self.id,
        by: self.by,
        time: self.time,
        dead: self.dead,
        score: self.score,
        url: self.url.unwrap_or_default(),
        title: self.title,
        text: self.text,
        kids,
      }),
      ItemKind::Job => LiveItem::Job(JobView {
        id: self.id,
        by: self.by,
        time: self.time,
        dead: self.dead,
        score: self.score,
        url: self.url.unwrap_or_default(),
        title: self.title,
        text: self.text,
      }),
    };
    ItemView::Live(live)
  }

  /// The compact listing form used by user pages and favorites.
  pub fn summary(&self) -> ItemSummary {
    ItemSummary {
      id:     self.id,
      kind:   self.kind,
      time:   self.time,
      title:  self.title.clone(),
      text:   self.text.clone(),
      url:    self.url.clone(),
      score:  self.score,
      parent: self.parent,
    }
  }
}

// ─── Projections ─────────────────────────────────────────────────────────────

/// What `GET /item/{id}` returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemView {
  Deleted(Tombstone),
  Live(LiveItem),
}

impl ItemView {
  pub fn id(&self) -> ItemId {
    match self {
      Self::Deleted(t) => t.id,
      Self::Live(LiveItem::Comment(c)) => c.id,
      Self::Live(LiveItem::Story(s)) => s.id,
      Self::Live(LiveItem::Job(j)) => j.id,
    }
  }

  pub fn kind(&self) -> ItemKind {
    match self {
      Self::Deleted(t) => t.kind,
      Self::Live(LiveItem::Comment(_)) => ItemKind::Comment,
      Self::Live(LiveItem::Story(_)) => ItemKind::Story,
      Self::Live(LiveItem::Job(_)) => ItemKind::Job,
    }
  }

  /// Direct children, or an empty slice for tombstones, jobs and leaves.
  pub fn kids(&self) -> &[ItemId] {
    match self {
      Self::Live(LiveItem::Comment(c)) => c.kids.as_deref().unwrap_or_default(),
      Self::Live(LiveItem::Story(s)) => s.kids.as_deref().unwrap_or_default(),
      _ => &[],
    }
  }

  pub fn is_deleted(&self) -> bool { matches!(self, Self::Deleted(_)) }
}

/// Minimal projection returned in place of a deleted item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tombstone {
  #[serde(rename = "type")]
  pub kind:    ItemKind,
  pub id:      ItemId,
  pub deleted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LiveItem {
  Comment(CommentView),
  Story(StoryView),
  Job(JobView),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentView {
  pub id:     ItemId,
  pub by:     String,
  #[serde(with = "ts_milliseconds")]
  pub time:   DateTime<Utc>,
  pub dead:   bool,
  pub score:  i64,
  pub text:   String,
  pub parent: ItemId,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub kids:   Option<Vec<ItemId>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryView {
  pub id:    ItemId,
  pub by:    String,
  #[serde(with = "ts_milliseconds")]
  pub time:  DateTime<Utc>,
  pub dead:  bool,
  pub score: i64,
  pub url:   String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub title: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub text:  Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub kids:  Option<Vec<ItemId>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobView {
  pub id:    ItemId,
  pub by:    String,
  #[serde(with = "ts_milliseconds")]
  pub time:  DateTime<Utc>,
  pub dead:  bool,
  pub score: i64,
  pub url:   String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub title: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub text:  Option<String>,
}

/// Listing form of an item: no author, no kids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSummary {
  pub id:     ItemId,
  #[serde(rename = "type")]
  pub kind:   ItemKind,
  #[serde(with = "ts_milliseconds")]
  pub time:   DateTime<Utc>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub title:  Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub text:   Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub url:    Option<String>,
  pub score:  i64,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub parent: Option<ItemId>,
}

// ─── Input ───────────────────────────────────────────────────────────────────

/// Input to [`crate::store::NewsStore::insert_item`]. Each variant carries
/// exactly the fields its kind requires; `time`, `score` and the moderation
/// flags are always set by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NewItem {
  Comment {
    by:     String,
    parent: ItemId,
    text:   String,
  },
  Story {
    by:    String,
    /// May be empty for text-only stories.
    url:   String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text:  Option<String>,
  },
  Job {
    by:    String,
    url:   String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text:  Option<String>,
  },
}

impl NewItem {
  pub fn comment(
    by: impl Into<String>,
    parent: ItemId,
    text: impl Into<String>,
  ) -> Self {
    Self::Comment { by: by.into(), parent, text: text.into() }
  }

  pub fn story(
    by: impl Into<String>,
    title: impl Into<String>,
    url: impl Into<String>,
  ) -> Self {
    Self::Story {
      by:    by.into(),
      url:   url.into(),
      title: Some(title.into()),
      text:  None,
    }
  }

  pub fn job(by: impl Into<String>, url: impl Into<String>) -> Self {
    Self::Job { by: by.into(), url: url.into(), title: None, text: None }
  }

  pub fn kind(&self) -> ItemKind {
    match self {
      Self::Comment { .. } => ItemKind::Comment,
      Self::Story { .. } => ItemKind::Story,
      Self::Job { .. } => ItemKind::Job,
    }
  }

  pub fn by(&self) -> &str {
    match self {
      Self::Comment { by, .. } | Self::Story { by, .. } | Self::Job { by, .. } => {
        by
      }
    }
  }
}

/// Moderation flags for [`crate::store::NewsStore::set_item_flags`]. `None`
/// leaves a flag unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFlags {
  pub deleted: Option<bool>,
  pub dead:    Option<bool>,
}

// ─── Votes and favorites ─────────────────────────────────────────────────────

/// The `type` field of a vote request. Only `Up` is acted upon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum VoteDirection {
  Up,
  Down,
}

impl VoteDirection {
  /// Votes toggle an upvote; a downvote is syntactically valid but refused.
  pub fn require_up(self) -> Result<()> {
    match self {
      Self::Up => Ok(()),
      Self::Down => Err(Error::UnsupportedVote(self.to_string())),
    }
  }
}

/// Result of toggling an upvote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteOutcome {
  pub id:      ItemId,
  pub score:   i64,
  pub upvoted: bool,
}

/// Result of toggling a favorite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteOutcome {
  pub id:        ItemId,
  pub favorited: bool,
}

/// One entry of a user's favorites list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteSummary {
  #[serde(flatten)]
  pub item:         ItemSummary,
  #[serde(with = "ts_milliseconds")]
  pub favorited_at: DateTime<Utc>,
}
