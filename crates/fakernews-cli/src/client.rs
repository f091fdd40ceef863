//! Async HTTP client wrapping the fakernews JSON API.

use std::{
  collections::{BTreeMap, HashMap, VecDeque},
  time::Duration,
};

use anyhow::{Context, Result, anyhow};
use fakernews_core::{
  game::{GameKind, GameScore, Leaderboard, UserScores},
  item::{
    FavoriteOutcome, FavoriteSummary, ItemFlags, ItemId, ItemKind, ItemSummary,
    ItemView, NewItem, VoteDirection, VoteOutcome,
  },
  listing::Listing,
  user::User,
};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::json;

/// Connection settings for the fakernews API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
}

/// Async HTTP client for the fakernews JSON API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
  }

  /// Send `req` and decode a JSON body, surfacing the server's `error`
  /// message on failure.
  async fn fetch<T: DeserializeOwned>(&self, req: RequestBuilder, what: &str) -> Result<T> {
    let resp = req.send().await.with_context(|| format!("{what} failed"))?;
    let resp = check(resp, what).await?;
    resp
      .json()
      .await
      .with_context(|| format!("deserialising {what}"))
  }

  /// Like [`Self::fetch`] but maps 404 to `None`.
  async fn fetch_optional<T: DeserializeOwned>(
    &self,
    req: RequestBuilder,
    what: &str,
  ) -> Result<Option<T>> {
    let resp = req.send().await.with_context(|| format!("{what} failed"))?;
    if resp.status() == StatusCode::NOT_FOUND {
      return Ok(None);
    }
    let resp = check(resp, what).await?;
    Ok(Some(
      resp
        .json()
        .await
        .with_context(|| format!("deserialising {what}"))?,
    ))
  }

  // ── Items ─────────────────────────────────────────────────────────────────

  /// `GET /item/:id`
  pub async fn get_item(&self, id: ItemId) -> Result<Option<ItemView>> {
    let path = format!("/item/{id}");
    self
      .fetch_optional(self.client.get(self.url(&path)), &format!("GET {path}"))
      .await
  }

  /// `POST /item`
  pub async fn create_item(&self, item: &NewItem) -> Result<ItemView> {
    self
      .fetch(self.client.post(self.url("/item")).json(item), "POST /item")
      .await
  }

  /// `DELETE /item/:id`
  pub async fn delete_item(&self, id: ItemId) -> Result<()> {
    let path = format!("/item/{id}");
    let what = format!("DELETE {path}");
    let resp = self
      .client
      .delete(self.url(&path))
      .send()
      .await
      .with_context(|| format!("{what} failed"))?;
    check(resp, &what).await?;
    Ok(())
  }

  /// `PATCH /item/:id`
  pub async fn set_flags(&self, id: ItemId, flags: ItemFlags) -> Result<ItemView> {
    let path = format!("/item/{id}");
    self
      .fetch(
        self.client.patch(self.url(&path)).json(&flags),
        &format!("PATCH {path}"),
      )
      .await
  }

  /// `POST /item/items/:id/vote`
  pub async fn vote(&self, id: ItemId, user_id: &str) -> Result<VoteOutcome> {
    let path = format!("/item/items/{id}/vote");
    let body = json!({ "type": VoteDirection::Up, "userId": user_id });
    self
      .fetch(
        self.client.post(self.url(&path)).json(&body),
        &format!("POST {path}"),
      )
      .await
  }

  /// `POST /item/items/:id/favorite`
  pub async fn favorite(&self, id: ItemId, user_id: &str) -> Result<FavoriteOutcome> {
    let path = format!("/item/items/{id}/favorite");
    self
      .fetch(
        self.client.post(self.url(&path)).json(&json!({ "userId": user_id })),
        &format!("POST {path}"),
      )
      .await
  }

  /// `POST /item/items/upvotes/check`
  pub async fn upvote_statuses(
    &self,
    user_id: &str,
    ids: &[ItemId],
  ) -> Result<BTreeMap<ItemId, bool>> {
    self
      .status_check("/item/items/upvotes/check", user_id, ids)
      .await
  }

  /// `POST /item/items/favorites/check`
  pub async fn favorite_statuses(
    &self,
    user_id: &str,
    ids: &[ItemId],
  ) -> Result<BTreeMap<ItemId, bool>> {
    self
      .status_check("/item/items/favorites/check", user_id, ids)
      .await
  }

  async fn status_check(
    &self,
    path: &str,
    user_id: &str,
    ids: &[ItemId],
  ) -> Result<BTreeMap<ItemId, bool>> {
    let body = json!({ "userId": user_id, "itemIds": ids });
    // JSON object keys are strings; parse them back into ids.
    let raw: BTreeMap<String, bool> = self
      .fetch(
        self.client.post(self.url(path)).json(&body),
        &format!("POST {path}"),
      )
      .await?;
    raw
      .into_iter()
      .map(|(k, v)| {
        let id: ItemId =
          k.parse().with_context(|| format!("bad item id {k:?}"))?;
        Ok::<_, anyhow::Error>((id, v))
      })
      .collect()
  }

  /// Fetch `root` and all of its descendants, breadth first.
  ///
  /// Items that vanish between listing and lookup are skipped.
  pub async fn get_thread(&self, root: ItemId) -> Result<HashMap<ItemId, ItemView>> {
    let mut items = HashMap::new();
    let mut queue = VecDeque::from([root]);

    while let Some(id) = queue.pop_front() {
      if items.contains_key(&id) {
        continue;
      }
      let Some(item) = self.get_item(id).await? else {
        tracing::debug!(id, "item disappeared while loading thread");
        continue;
      };
      queue.extend(item.kids().iter().copied());
      items.insert(id, item);
    }
    Ok(items)
  }

  // ── Users ─────────────────────────────────────────────────────────────────

  /// `GET /user/:id`
  pub async fn get_user(&self, id: &str) -> Result<Option<User>> {
    let path = format!("/user/{id}");
    self
      .fetch_optional(self.client.get(self.url(&path)), &format!("GET {path}"))
      .await
  }

  /// `POST /user`
  pub async fn create_user(&self, id: &str, about: Option<&str>) -> Result<User> {
    let body = json!({ "id": id, "about": about });
    self
      .fetch(self.client.post(self.url("/user")).json(&body), "POST /user")
      .await
  }

  /// `GET /user/:id/items[?type=..]`
  pub async fn user_items(
    &self,
    id: &str,
    kind: Option<ItemKind>,
  ) -> Result<Vec<ItemSummary>> {
    let path = format!("/user/{id}/items");
    let mut req = self.client.get(self.url(&path));
    if let Some(kind) = kind {
      req = req.query(&[("type", kind.as_ref())]);
    }
    self.fetch(req, &format!("GET {path}")).await
  }

  /// `GET /user/:id/favorites`
  pub async fn user_favorites(&self, id: &str) -> Result<Vec<FavoriteSummary>> {
    let path = format!("/user/{id}/favorites");
    self
      .fetch(self.client.get(self.url(&path)), &format!("GET {path}"))
      .await
  }

  /// `PATCH /user/:id/karma`
  pub async fn adjust_karma(&self, id: &str, delta: i64) -> Result<User> {
    let path = format!("/user/{id}/karma");
    self
      .fetch(
        self.client.patch(self.url(&path)).json(&json!({ "delta": delta })),
        &format!("PATCH {path}"),
      )
      .await
  }

  // ── Listings ──────────────────────────────────────────────────────────────

  /// `GET /top/:listing?limit=..&offset=..`
  pub async fn top(&self, listing: Listing, limit: u32, offset: u32) -> Result<Vec<ItemId>> {
    let path = format!("/top/{listing}");
    self
      .fetch(
        self
          .client
          .get(self.url(&path))
          .query(&[("limit", limit), ("offset", offset)]),
        &format!("GET {path}"),
      )
      .await
  }

  // ── Games ─────────────────────────────────────────────────────────────────

  /// `POST /games/:game` with the game's submission body.
  pub async fn submit_score<B: Serialize>(&self, game: GameKind, body: &B) -> Result<GameScore> {
    let path = format!("/games/{game}");
    self
      .fetch(
        self.client.post(self.url(&path)).json(body),
        &format!("POST {path}"),
      )
      .await
  }

  /// `GET /games/:game/users/:userId`
  pub async fn user_scores(&self, game: GameKind, user_id: &str) -> Result<UserScores> {
    let path = format!("/games/{game}/users/{user_id}");
    self
      .fetch(self.client.get(self.url(&path)), &format!("GET {path}"))
      .await
  }

  /// `GET /games/leaderboard/:game?limit=..`
  pub async fn leaderboard(&self, game: GameKind, limit: u32) -> Result<Leaderboard> {
    let path = format!("/games/leaderboard/{game}");
    self
      .fetch(
        self.client.get(self.url(&path)).query(&[("limit", limit)]),
        &format!("GET {path}"),
      )
      .await
  }
}

/// Turn a non-2xx response into an error carrying the server's message.
async fn check(resp: Response, what: &str) -> Result<Response> {
  let status = resp.status();
  if status.is_success() {
    return Ok(resp);
  }
  let message = resp
    .json::<serde_json::Value>()
    .await
    .ok()
    .and_then(|body| body.get("error")?.as_str().map(str::to_owned))
    .unwrap_or_else(|| status.to_string());
  Err(anyhow!("{what} → {status}: {message}"))
}
