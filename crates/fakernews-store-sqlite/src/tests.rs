//! Integration tests for `SqliteStore` against an in-memory database.

use fakernews_core::{
  Classify, ErrorClass,
  game::{GameKind, GameStats, NewGameScore, SubmitSnake},
  item::{ItemFlags, ItemKind, ItemView, LiveItem, NewItem},
  listing::{Listing, Page},
  store::NewsStore,
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn store_with_users(ids: &[&str]) -> SqliteStore {
  let s = store().await;
  for id in ids {
    s.create_user((*id).into(), None).await.unwrap();
  }
  s
}

fn class<T: std::fmt::Debug>(result: crate::Result<T>) -> ErrorClass {
  result.expect_err("expected an error").class()
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_user() {
  let s = store().await;

  let user = s
    .create_user("alice".into(), Some("hello".into()))
    .await
    .unwrap();
  assert_eq!(user.id, "alice");
  assert_eq!(user.karma, 0);
  assert_eq!(user.about.as_deref(), Some("hello"));

  let fetched = s.get_user("alice".into()).await.unwrap().unwrap();
  assert_eq!(fetched, user);
}

#[tokio::test]
async fn get_user_missing_returns_none() {
  let s = store().await;
  assert!(s.get_user("nobody".into()).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_user_conflicts_and_keeps_the_first() {
  let s = store_with_users(&["alice"]).await;
  let first = s.adjust_karma("alice".into(), 3).await.unwrap();

  let again = s.create_user("alice".into(), Some("other".into())).await;
  assert_eq!(class(again), ErrorClass::Conflict);

  let fetched = s.get_user("alice".into()).await.unwrap().unwrap();
  assert_eq!(fetched, first);
}

#[tokio::test]
async fn karma_never_goes_negative() {
  let s = store_with_users(&["alice"]).await;

  let user = s.adjust_karma("alice".into(), 2).await.unwrap();
  assert_eq!(user.karma, 2);
  let user = s.adjust_karma("alice".into(), -5).await.unwrap();
  assert_eq!(user.karma, 0);
  let user = s.adjust_karma("alice".into(), -1).await.unwrap();
  assert_eq!(user.karma, 0);
}

#[tokio::test]
async fn karma_of_unknown_user_is_not_found() {
  let s = store().await;
  let result = s.adjust_karma("ghost".into(), 1).await;
  assert_eq!(class(result), ErrorClass::NotFound);
}

#[tokio::test]
async fn user_items_filter_by_kind_and_skip_deleted() {
  let s = store_with_users(&["alice"]).await;
  let story = s
    .insert_item(NewItem::story("alice", "Hello", "https://a.example"))
    .await
    .unwrap();
  let comment = s
    .insert_item(NewItem::comment("alice", story.id, "first"))
    .await
    .unwrap();
  let gone = s
    .insert_item(NewItem::story("alice", "Gone", "https://b.example"))
    .await
    .unwrap();
  s.set_item_flags(gone.id, ItemFlags { deleted: Some(true), dead: None })
    .await
    .unwrap();

  let all = s.user_items("alice".into(), None).await.unwrap();
  let ids: Vec<_> = all.iter().map(|i| i.id).collect();
  assert_eq!(ids, vec![comment.id, story.id]);

  let comments = s
    .user_items("alice".into(), Some(ItemKind::Comment))
    .await
    .unwrap();
  assert_eq!(comments.len(), 1);
  assert_eq!(comments[0].parent, Some(story.id));
  assert_eq!(comments[0].text.as_deref(), Some("first"));
}

#[tokio::test]
async fn user_items_of_unknown_user_is_not_found() {
  let s = store().await;
  let result = s.user_items("ghost".into(), None).await;
  assert_eq!(class(result), ErrorClass::NotFound);
}

#[tokio::test]
async fn user_items_are_capped() {
  let s = store_with_users(&["alice"]).await;
  let root = s
    .insert_item(NewItem::story("alice", "Root", ""))
    .await
    .unwrap();
  for n in 0..110 {
    s.insert_item(NewItem::comment("alice", root.id, format!("c{n}")))
      .await
      .unwrap();
  }

  let items = s.user_items("alice".into(), None).await.unwrap();
  assert_eq!(items.len(), 100);
}

// ─── Items ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn story_round_trips_through_lookup() {
  let s = store_with_users(&["alice"]).await;
  let item = s
    .insert_item(NewItem::Story {
      by:    "alice".into(),
      url:   "https://example.com".into(),
      title: Some("Example".into()),
      text:  None,
    })
    .await
    .unwrap();
  assert_eq!(item.score, 0);
  assert!(!item.deleted && !item.dead);

  let view = s.get_item(item.id).await.unwrap().unwrap();
  let ItemView::Live(LiveItem::Story(story)) = view else {
    panic!("expected a live story, got {view:?}");
  };
  assert_eq!(story.by, "alice");
  assert_eq!(story.url, "https://example.com");
  assert_eq!(story.title.as_deref(), Some("Example"));
  assert_eq!(story.text, None);
  assert_eq!(story.kids, None);
}

#[tokio::test]
async fn kids_are_listed_in_id_order() {
  let s = store_with_users(&["alice", "bob"]).await;
  let story = s
    .insert_item(NewItem::story("alice", "Root", "https://r.example"))
    .await
    .unwrap();
  let c1 = s
    .insert_item(NewItem::comment("bob", story.id, "one"))
    .await
    .unwrap();
  let c2 = s
    .insert_item(NewItem::comment("alice", story.id, "two"))
    .await
    .unwrap();

  let view = s.get_item(story.id).await.unwrap().unwrap();
  assert_eq!(view.kids(), &[c1.id, c2.id]);

  let leaf = s.get_item(c1.id).await.unwrap().unwrap();
  assert_eq!(leaf.kind(), ItemKind::Comment);
  assert!(leaf.kids().is_empty());
}

#[tokio::test]
async fn deleted_items_are_tombstones() {
  let s = store_with_users(&["alice"]).await;
  let item = s
    .insert_item(NewItem::job("alice", "https://jobs.example"))
    .await
    .unwrap();
  s.set_item_flags(item.id, ItemFlags { deleted: Some(true), dead: None })
    .await
    .unwrap();

  let view = s.get_item(item.id).await.unwrap().unwrap();
  assert!(view.is_deleted());
  assert_eq!(view.kind(), ItemKind::Job);
}

#[tokio::test]
async fn comment_with_dangling_parent_is_rejected() {
  let s = store_with_users(&["alice"]).await;
  let result = s.insert_item(NewItem::comment("alice", 9999, "orphan")).await;
  assert_eq!(class(result), ErrorClass::Internal);
}

#[tokio::test]
async fn item_by_unknown_author_is_rejected() {
  let s = store().await;
  let result = s
    .insert_item(NewItem::story("ghost", "Boo", "https://g.example"))
    .await;
  assert_eq!(class(result), ErrorClass::Internal);
}

#[tokio::test]
async fn delete_cascades_through_the_tree() {
  let s = store_with_users(&["alice", "bob"]).await;
  let root = s
    .insert_item(NewItem::story("alice", "Root", "https://r.example"))
    .await
    .unwrap();
  let child = s
    .insert_item(NewItem::comment("bob", root.id, "child"))
    .await
    .unwrap();
  let grandchild = s
    .insert_item(NewItem::comment("alice", child.id, "grandchild"))
    .await
    .unwrap();
  s.toggle_upvote(grandchild.id, "carol".into()).await.unwrap();
  s.toggle_favorite(child.id, "carol".into()).await.unwrap();

  s.delete_item(root.id).await.unwrap();

  for id in [root.id, child.id, grandchild.id] {
    assert!(s.get_item(id).await.unwrap().is_none());
  }
  assert!(!s.has_upvoted(grandchild.id, "carol".into()).await.unwrap());
  assert!(!s.has_favorited(child.id, "carol".into()).await.unwrap());
  assert!(s.user_favorites("carol".into()).await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_missing_item_is_not_found() {
  let s = store().await;
  assert_eq!(class(s.delete_item(42).await), ErrorClass::NotFound);
}

#[tokio::test]
async fn flags_update_independently() {
  let s = store_with_users(&["alice"]).await;
  let item = s
    .insert_item(NewItem::story("alice", "Flagged", "https://f.example"))
    .await
    .unwrap();

  let dead = s
    .set_item_flags(item.id, ItemFlags { deleted: None, dead: Some(true) })
    .await
    .unwrap();
  assert!(dead.dead);
  assert!(!dead.deleted);

  let revived = s
    .set_item_flags(item.id, ItemFlags { deleted: None, dead: Some(false) })
    .await
    .unwrap();
  assert!(!revived.dead);

  let missing = s.set_item_flags(999, ItemFlags::default()).await;
  assert_eq!(class(missing), ErrorClass::NotFound);
}

// ─── Votes ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn vote_toggle_moves_score_and_karma() {
  let s = store_with_users(&["alice"]).await;
  let story = s
    .insert_item(NewItem::story("alice", "Vote me", "https://v.example"))
    .await
    .unwrap();

  let first = s.toggle_upvote(story.id, "bob".into()).await.unwrap();
  assert_eq!((first.id, first.score, first.upvoted), (story.id, 1, true));
  assert_eq!(s.get_user("alice".into()).await.unwrap().unwrap().karma, 1);
  assert!(s.has_upvoted(story.id, "bob".into()).await.unwrap());

  let second = s.toggle_upvote(story.id, "bob".into()).await.unwrap();
  assert_eq!((second.score, second.upvoted), (0, false));
  assert_eq!(s.get_user("alice".into()).await.unwrap().unwrap().karma, 0);
  assert!(!s.has_upvoted(story.id, "bob".into()).await.unwrap());
}

#[tokio::test]
async fn votes_from_different_users_accumulate() {
  let s = store_with_users(&["alice"]).await;
  let story = s
    .insert_item(NewItem::story("alice", "Popular", "https://p.example"))
    .await
    .unwrap();

  s.toggle_upvote(story.id, "bob".into()).await.unwrap();
  let outcome = s.toggle_upvote(story.id, "carol".into()).await.unwrap();
  assert_eq!(outcome.score, 2);
  assert_eq!(s.get_user("alice".into()).await.unwrap().unwrap().karma, 2);
}

#[tokio::test]
async fn unvote_never_drives_karma_below_zero() {
  let s = store_with_users(&["alice"]).await;
  let story = s
    .insert_item(NewItem::story("alice", "Clamp", "https://c.example"))
    .await
    .unwrap();

  s.toggle_upvote(story.id, "bob".into()).await.unwrap();
  s.adjust_karma("alice".into(), -10).await.unwrap();

  let outcome = s.toggle_upvote(story.id, "bob".into()).await.unwrap();
  assert_eq!(outcome.score, 0);
  assert_eq!(s.get_user("alice".into()).await.unwrap().unwrap().karma, 0);
}

#[tokio::test]
async fn dead_or_deleted_items_cannot_be_voted() {
  let s = store_with_users(&["alice"]).await;
  let dead = s
    .insert_item(NewItem::story("alice", "Dead", "https://d.example"))
    .await
    .unwrap();
  let deleted = s
    .insert_item(NewItem::story("alice", "Deleted", "https://x.example"))
    .await
    .unwrap();
  s.set_item_flags(dead.id, ItemFlags { deleted: None, dead: Some(true) })
    .await
    .unwrap();
  s.set_item_flags(deleted.id, ItemFlags { deleted: Some(true), dead: None })
    .await
    .unwrap();

  for id in [dead.id, deleted.id, 12345] {
    let result = s.toggle_upvote(id, "bob".into()).await;
    assert_eq!(class(result), ErrorClass::NotFound);
  }
  assert!(!s.has_upvoted(dead.id, "bob".into()).await.unwrap());
}

#[tokio::test]
async fn upvote_statuses_cover_every_requested_id() {
  let s = store_with_users(&["alice"]).await;
  let a = s
    .insert_item(NewItem::story("alice", "A", "https://a.example"))
    .await
    .unwrap();
  let b = s
    .insert_item(NewItem::story("alice", "B", "https://b.example"))
    .await
    .unwrap();
  s.toggle_upvote(a.id, "bob".into()).await.unwrap();

  let statuses = s
    .upvote_statuses("bob".into(), vec![a.id, b.id, 777])
    .await
    .unwrap();
  assert_eq!(statuses.len(), 3);
  assert_eq!(statuses[&a.id], true);
  assert_eq!(statuses[&b.id], false);
  assert_eq!(statuses[&777], false);

  assert!(s.upvote_statuses("bob".into(), vec![]).await.unwrap().is_empty());
}

// ─── Favorites ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn favorite_toggle_has_no_score_effect() {
  let s = store_with_users(&["alice"]).await;
  let story = s
    .insert_item(NewItem::story("alice", "Fave", "https://f.example"))
    .await
    .unwrap();

  let on = s.toggle_favorite(story.id, "bob".into()).await.unwrap();
  assert!(on.favorited);
  assert!(s.has_favorited(story.id, "bob".into()).await.unwrap());

  let Some(ItemView::Live(LiveItem::Story(view))) =
    s.get_item(story.id).await.unwrap()
  else {
    panic!("expected a live story");
  };
  assert_eq!(view.score, 0);
  assert_eq!(s.get_user("alice".into()).await.unwrap().unwrap().karma, 0);

  let off = s.toggle_favorite(story.id, "bob".into()).await.unwrap();
  assert!(!off.favorited);
  assert!(!s.has_favorited(story.id, "bob".into()).await.unwrap());
}

#[tokio::test]
async fn dead_items_can_be_favorited_but_deleted_ones_cannot() {
  let s = store_with_users(&["alice"]).await;
  let item = s
    .insert_item(NewItem::story("alice", "Dead", "https://d.example"))
    .await
    .unwrap();
  s.set_item_flags(item.id, ItemFlags { deleted: None, dead: Some(true) })
    .await
    .unwrap();
  assert!(s.toggle_favorite(item.id, "bob".into()).await.unwrap().favorited);

  s.set_item_flags(item.id, ItemFlags { deleted: Some(true), dead: None })
    .await
    .unwrap();
  let result = s.toggle_favorite(item.id, "bob".into()).await;
  assert_eq!(class(result), ErrorClass::NotFound);
}

#[tokio::test]
async fn user_favorites_are_newest_first() {
  let s = store_with_users(&["alice"]).await;
  let a = s
    .insert_item(NewItem::story("alice", "A", "https://a.example"))
    .await
    .unwrap();
  let b = s
    .insert_item(NewItem::job("alice", "https://b.example"))
    .await
    .unwrap();
  s.toggle_favorite(a.id, "bob".into()).await.unwrap();
  s.toggle_favorite(b.id, "bob".into()).await.unwrap();

  let faves = s.user_favorites("bob".into()).await.unwrap();
  let ids: Vec<_> = faves.iter().map(|f| f.item.id).collect();
  assert_eq!(ids, vec![b.id, a.id]);
  assert_eq!(faves[0].item.kind, ItemKind::Job);
  assert_eq!(faves[1].item.title.as_deref(), Some("A"));

  let statuses = s
    .favorite_statuses("bob".into(), vec![a.id, b.id])
    .await
    .unwrap();
  assert!(statuses.values().all(|v| *v));

  assert!(s.user_favorites("nobody".into()).await.unwrap().is_empty());
}

// ─── Listings ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn top_stories_rank_by_score_and_hide_flagged_items() {
  let s = store_with_users(&["alice"]).await;
  let mut ids = Vec::new();
  for n in 0..4 {
    let item = s
      .insert_item(NewItem::story("alice", format!("S{n}"), "https://s.example"))
      .await
      .unwrap();
    ids.push(item.id);
  }
  s.toggle_upvote(ids[1], "bob".into()).await.unwrap();
  s.toggle_upvote(ids[1], "carol".into()).await.unwrap();
  s.toggle_upvote(ids[2], "bob".into()).await.unwrap();
  // The flagged stories outrank every live one before they are flagged.
  for voter in ["bob", "carol", "dave"] {
    s.toggle_upvote(ids[0], voter.into()).await.unwrap();
    s.toggle_upvote(ids[3], voter.into()).await.unwrap();
  }
  s.set_item_flags(ids[3], ItemFlags { deleted: None, dead: Some(true) })
    .await
    .unwrap();
  s.set_item_flags(ids[0], ItemFlags { deleted: Some(true), dead: None })
    .await
    .unwrap();

  let top = s
    .list_items(Listing::TopStories, Page::default())
    .await
    .unwrap();
  assert_eq!(top, vec![ids[1], ids[2]]);
}

#[tokio::test]
async fn new_stories_are_newest_first_and_page() {
  let s = store_with_users(&["alice"]).await;
  let mut ids = Vec::new();
  for n in 0..5 {
    let item = s
      .insert_item(NewItem::story("alice", format!("S{n}"), ""))
      .await
      .unwrap();
    ids.push(item.id);
  }
  s.toggle_upvote(ids[0], "bob".into()).await.unwrap();
  ids.reverse();

  let all = s
    .list_items(Listing::NewStories, Page::default())
    .await
    .unwrap();
  assert_eq!(all, ids);

  let page = s
    .list_items(Listing::NewStories, Page::new(Some(2), Some(1)))
    .await
    .unwrap();
  assert_eq!(page, ids[1..3].to_vec());
}

#[tokio::test]
async fn listings_only_return_their_kind() {
  let s = store_with_users(&["alice"]).await;
  let story = s
    .insert_item(NewItem::story("alice", "Story", "https://s.example"))
    .await
    .unwrap();
  let comment = s
    .insert_item(NewItem::comment("alice", story.id, "hi"))
    .await
    .unwrap();
  let job = s
    .insert_item(NewItem::job("alice", "https://j.example"))
    .await
    .unwrap();

  let page = Page::default();
  assert_eq!(
    s.list_items(Listing::TopComments, page).await.unwrap(),
    vec![comment.id]
  );
  assert_eq!(s.list_items(Listing::TopJobs, page).await.unwrap(), vec![job.id]);
  assert_eq!(
    s.list_items(Listing::TopStories, page).await.unwrap(),
    vec![story.id]
  );
}

// ─── Games ───────────────────────────────────────────────────────────────────

fn snake(user: &str, score: i64) -> NewGameScore {
  SubmitSnake {
    user_id: user.into(),
    score,
    duration: 30,
    food_eaten: None,
  }
  .into()
}

#[tokio::test]
async fn submitted_score_round_trips() {
  let s = store_with_users(&["bob"]).await;

  let row = s.submit_score(snake("bob", 50)).await.unwrap();
  assert_eq!(row.user_id, "bob");
  assert_eq!(row.stats, GameStats::Snake { duration: 30, food_eaten: 0 });

  let scores = s.user_scores(GameKind::Snake, "bob".into()).await.unwrap();
  assert_eq!(scores, vec![row]);
  assert!(
    s.user_scores(GameKind::Game2048, "bob".into())
      .await
      .unwrap()
      .is_empty()
  );
}

#[tokio::test]
async fn snake_score_reaches_the_leaderboard() {
  let s = store_with_users(&["alice", "bob"]).await;
  s.submit_score(snake("alice", 10)).await.unwrap();
  s.submit_score(snake("alice", 70)).await.unwrap();
  s.submit_score(snake("bob", 50)).await.unwrap();
  s.submit_score(NewGameScore {
    user_id: "bob".into(),
    score:   999,
    stats:   GameStats::Game2048 { best_tile: 512, moves: 80 },
  })
  .await
  .unwrap();

  let board = s.leaderboard(GameKind::Snake, 5).await.unwrap();
  let rows: Vec<_> = board
    .iter()
    .map(|e| (e.user.id.as_str(), e.score.score))
    .collect();
  assert_eq!(rows, vec![("alice", 70), ("bob", 50), ("alice", 10)]);

  let top = s.leaderboard(GameKind::Snake, 1).await.unwrap();
  assert_eq!(top.len(), 1);
}

#[tokio::test]
async fn user_scores_keep_the_best_ten() {
  let s = store_with_users(&["alice"]).await;
  for score in 0..12 {
    s.submit_score(NewGameScore {
      user_id: "alice".into(),
      score,
      stats: GameStats::FlappyBird { pipes_passed: score, duration: 5 },
    })
    .await
    .unwrap();
  }

  let scores = s
    .user_scores(GameKind::FlappyBird, "alice".into())
    .await
    .unwrap();
  assert_eq!(scores.len(), 10);
  assert_eq!(scores[0].score, 11);
  assert_eq!(scores[9].score, 2);
}

#[tokio::test]
async fn score_for_unknown_user_fails() {
  let s = store().await;
  let result = s.submit_score(snake("ghost", 5)).await;
  assert_eq!(class(result), ErrorClass::Internal);
}
