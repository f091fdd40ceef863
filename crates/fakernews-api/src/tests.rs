//! Router-level tests: every request goes through `api_router` against an
//! in-memory SQLite store.

use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{Method, Request, StatusCode, header},
};
use fakernews_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::api_router;

async fn app() -> Router {
  let store = SqliteStore::open_in_memory().await.unwrap();
  api_router(Arc::new(store))
}

async fn send(
  app: &Router,
  method: Method,
  uri: &str,
  body: Option<Value>,
) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  let body = match body {
    Some(json) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(json.to_string())
    }
    None => Body::empty(),
  };
  let resp = app
    .clone()
    .oneshot(builder.body(body).unwrap())
    .await
    .unwrap();

  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
    .await
    .unwrap();
  let value = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, value)
}

async fn register(app: &Router, id: &str) {
  let (status, _) =
    send(app, Method::POST, "/user", Some(json!({ "id": id }))).await;
  assert_eq!(status, StatusCode::CREATED);
}

async fn post_story(app: &Router, by: &str, title: &str) -> i64 {
  let (status, body) = send(
    app,
    Method::POST,
    "/item",
    Some(json!({
      "type": "story",
      "by": by,
      "title": title,
      "url": "https://example.com",
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "{body}");
  body["id"].as_i64().unwrap()
}

// ── Items ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn created_story_omits_absent_fields() {
  let app = app().await;
  register(&app, "alice").await;
  let id = post_story(&app, "alice", "Hello").await;

  let (status, body) = send(&app, Method::GET, &format!("/item/{id}"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["type"], "story");
  assert_eq!(body["by"], "alice");
  assert_eq!(body["score"], 0);
  assert_eq!(body["dead"], false);
  assert!(body["time"].is_i64());
  let obj = body.as_object().unwrap();
  assert!(!obj.contains_key("text"));
  assert!(!obj.contains_key("kids"));
}

#[tokio::test]
async fn comments_show_up_as_kids() {
  let app = app().await;
  register(&app, "alice").await;
  let story = post_story(&app, "alice", "Root").await;

  let (status, comment) = send(
    &app,
    Method::POST,
    "/item",
    Some(json!({ "type": "comment", "by": "alice", "parent": story, "text": "hi" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(comment["parent"], story);

  let (_, body) = send(&app, Method::GET, &format!("/item/{story}"), None).await;
  assert_eq!(body["kids"], json!([comment["id"]]));
}

#[tokio::test]
async fn comment_without_parent_is_rejected() {
  let app = app().await;
  register(&app, "alice").await;
  let (status, body) = send(
    &app,
    Method::POST,
    "/item",
    Some(json!({ "type": "comment", "by": "alice", "text": "orphan" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("parent"));
}

#[tokio::test]
async fn malformed_requests_get_json_errors() {
  let app = app().await;

  let (status, body) = send(&app, Method::GET, "/item/abc", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].is_string());

  let (status, body) =
    send(&app, Method::GET, "/top/stories?limit=lots", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].is_string());

  let (status, body) = send(
    &app,
    Method::POST,
    "/item/items/1/vote",
    Some(json!({ "type": "sideways", "userId": "alice" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].is_string());
}

#[tokio::test]
async fn missing_item_is_404_with_error_body() {
  let app = app().await;
  let (status, body) = send(&app, Method::GET, "/item/999", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert!(body["error"].is_string());

  let (status, _) = send(&app, Method::DELETE, "/item/999", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_then_lookup_is_404() {
  let app = app().await;
  register(&app, "alice").await;
  let id = post_story(&app, "alice", "Doomed").await;

  let (status, _) = send(&app, Method::DELETE, &format!("/item/{id}"), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  let (status, _) = send(&app, Method::GET, &format!("/item/{id}"), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn flagged_deleted_item_is_a_tombstone() {
  let app = app().await;
  register(&app, "alice").await;
  let id = post_story(&app, "alice", "Hidden").await;

  let (status, body) = send(
    &app,
    Method::PATCH,
    &format!("/item/{id}"),
    Some(json!({ "deleted": true })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({ "type": "story", "id": id, "deleted": true }));
}

// ── Votes ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn alice_bob_vote_scenario() {
  let app = app().await;
  register(&app, "alice").await;
  let id = post_story(&app, "alice", "Vote").await;
  let uri = format!("/item/items/{id}/vote");
  let vote = json!({ "type": "up", "userId": "bob" });

  let (status, body) = send(&app, Method::POST, &uri, Some(vote.clone())).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({ "id": id, "score": 1, "upvoted": true }));
  let (_, alice) = send(&app, Method::GET, "/user/alice", None).await;
  assert_eq!(alice["karma"], 1);

  let (_, status_body) = send(
    &app,
    Method::GET,
    &format!("/item/items/{id}/upvote?userId=bob"),
    None,
  )
  .await;
  assert_eq!(status_body, json!({ "upvoted": true }));

  let (_, body) = send(&app, Method::POST, &uri, Some(vote)).await;
  assert_eq!(body, json!({ "id": id, "score": 0, "upvoted": false }));
  let (_, alice) = send(&app, Method::GET, "/user/alice", None).await;
  assert_eq!(alice["karma"], 0);
}

#[tokio::test]
async fn vote_requires_user_before_direction() {
  let app = app().await;
  register(&app, "alice").await;
  let id = post_story(&app, "alice", "Vote").await;
  let uri = format!("/item/items/{id}/vote");

  let (status, _) = send(
    &app,
    Method::POST,
    &uri,
    Some(json!({ "type": "down", "userId": "" })),
  )
  .await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);

  let (status, _) = send(
    &app,
    Method::POST,
    &uri,
    Some(json!({ "type": "down", "userId": "bob" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, _) = send(
    &app,
    Method::POST,
    "/item/items/424242/vote",
    Some(json!({ "type": "up", "userId": "bob" })),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn batch_status_keys_are_strings() {
  let app = app().await;
  register(&app, "alice").await;
  let a = post_story(&app, "alice", "A").await;
  let b = post_story(&app, "alice", "B").await;
  send(
    &app,
    Method::POST,
    &format!("/item/items/{b}/favorite"),
    Some(json!({ "userId": "bob" })),
  )
  .await;

  let (status, body) = send(
    &app,
    Method::POST,
    "/item/items/favorites/check",
    Some(json!({ "userId": "bob", "itemIds": [a, b] })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body[a.to_string()], false);
  assert_eq!(body[b.to_string()], true);

  let (_, body) = send(
    &app,
    Method::POST,
    "/item/items/upvotes/check",
    Some(json!({ "userId": "bob", "itemIds": [a] })),
  )
  .await;
  assert_eq!(body, json!({ a.to_string(): false }));
}

#[tokio::test]
async fn favorite_requires_a_user() {
  let app = app().await;
  register(&app, "alice").await;
  let id = post_story(&app, "alice", "Fave").await;

  let (status, _) = send(
    &app,
    Method::POST,
    &format!("/item/items/{id}/favorite"),
    Some(json!({ "userId": "  " })),
  )
  .await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);

  let (status, _) = send(
    &app,
    Method::GET,
    &format!("/item/items/{id}/favorite"),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ── Users ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn duplicate_registration_is_409() {
  let app = app().await;
  register(&app, "alice").await;
  let (status, body) =
    send(&app, Method::POST, "/user", Some(json!({ "id": "alice" }))).await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert!(body["error"].as_str().unwrap().contains("alice"));
}

#[tokio::test]
async fn padded_user_ids_are_rejected_not_rewritten() {
  let app = app().await;
  for id in ["", "   ", "alice ", " alice"] {
    let (status, body) =
      send(&app, Method::POST, "/user", Some(json!({ "id": id }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{id:?}");
    assert!(body["error"].is_string());
  }

  let (status, _) = send(&app, Method::GET, "/user/alice", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn karma_patch_clamps_at_zero() {
  let app = app().await;
  register(&app, "alice").await;

  let (status, body) = send(
    &app,
    Method::PATCH,
    "/user/alice/karma",
    Some(json!({ "delta": -7 })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["karma"], 0);

  let (status, _) = send(
    &app,
    Method::PATCH,
    "/user/ghost/karma",
    Some(json!({ "delta": 1 })),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn user_items_and_favorites() {
  let app = app().await;
  register(&app, "alice").await;
  let story = post_story(&app, "alice", "Mine").await;
  send(
    &app,
    Method::POST,
    &format!("/item/items/{story}/favorite"),
    Some(json!({ "userId": "alice" })),
  )
  .await;

  let (status, items) =
    send(&app, Method::GET, "/user/alice/items?type=story", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(items[0]["id"], story);
  assert_eq!(items[0]["type"], "story");

  let (_, none) = send(&app, Method::GET, "/user/alice/items?type=job", None).await;
  assert_eq!(none, json!([]));

  let (_, faves) = send(&app, Method::GET, "/user/alice/favorites", None).await;
  assert_eq!(faves[0]["id"], story);
  assert!(faves[0]["favoritedAt"].is_i64());

  let (status, _) = send(&app, Method::GET, "/user/ghost/items", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  let (status, _) = send(&app, Method::GET, "/user/ghost", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

// ── Listings ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn top_stories_skip_flagged_items_even_when_they_score_highest() {
  let app = app().await;
  register(&app, "alice").await;
  let live = post_story(&app, "alice", "Live").await;
  let dead = post_story(&app, "alice", "Dead").await;
  let deleted = post_story(&app, "alice", "Deleted").await;

  for id in [dead, deleted] {
    for voter in ["bob", "carol"] {
      let (status, _) = send(
        &app,
        Method::POST,
        &format!("/item/items/{id}/vote"),
        Some(json!({ "type": "up", "userId": voter })),
      )
      .await;
      assert_eq!(status, StatusCode::OK);
    }
  }
  let (_, ranked) = send(&app, Method::GET, "/top/stories", None).await;
  assert_eq!(ranked[2], live);

  for (id, flag) in [(dead, "dead"), (deleted, "deleted")] {
    let (status, _) = send(
      &app,
      Method::PATCH,
      &format!("/item/{id}"),
      Some(json!({ flag: true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
  }

  let (status, ids) = send(&app, Method::GET, "/top/stories", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(ids, json!([live]));

  let (_, newest) = send(&app, Method::GET, "/top/new?limit=1", None).await;
  assert_eq!(newest, json!([live]));

  let (status, _) = send(&app, Method::GET, "/top/ask", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

// ── Games ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn snake_score_appears_on_leaderboard() {
  let app = app().await;
  register(&app, "bob").await;

  let (status, row) = send(
    &app,
    Method::POST,
    "/games/snake",
    Some(json!({ "userId": "bob", "score": 50, "duration": 30 })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(row["gameType"], "snake");
  assert_eq!(row["foodEaten"], 0);

  let (status, board) =
    send(&app, Method::GET, "/games/leaderboard/snake?limit=5", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(board["scores"][0]["score"], 50);
  assert_eq!(board["scores"][0]["user"], json!({ "id": "bob" }));
}

#[tokio::test]
async fn empty_user_scores_carry_a_message() {
  let app = app().await;
  register(&app, "bob").await;

  let (status, body) =
    send(&app, Method::GET, "/games/flappybird/users/bob", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["message"], "No Flappy Bird scores found for this user");
  assert_eq!(body["scores"], json!([]));

  send(
    &app,
    Method::POST,
    "/games/2048",
    Some(json!({ "userId": "bob", "score": 128 })),
  )
  .await;
  let (_, body) = send(&app, Method::GET, "/games/2048/users/bob", None).await;
  assert!(body.get("message").is_none());
  assert_eq!(body["scores"][0]["bestTile"], 2);
}

#[tokio::test]
async fn unknown_game_is_400() {
  let app = app().await;
  let (status, body) =
    send(&app, Method::GET, "/games/leaderboard/tetris", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(
    body["error"],
    "Invalid game type. Valid options: 2048, snake, flappybird"
  );

  let (status, _) = send(&app, Method::GET, "/games/tetris/users/bob", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn score_for_unknown_user_is_500() {
  let app = app().await;
  let (status, body) = send(
    &app,
    Method::POST,
    "/games/flappybird",
    Some(json!({ "userId": "ghost", "score": 3, "pipesPassed": 3, "duration": 8 })),
  )
  .await;
  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  assert_eq!(body["error"], "Failed to create Flappy Bird score");
}
