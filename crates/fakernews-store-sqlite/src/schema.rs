//! SQL schema for the fakernews SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    id      TEXT PRIMARY KEY,
    created INTEGER NOT NULL,           -- Unix milliseconds
    karma   INTEGER NOT NULL DEFAULT 0 CHECK (karma >= 0),
    about   TEXT
);

CREATE TABLE IF NOT EXISTS items (
    id      INTEGER PRIMARY KEY,
    kind    TEXT NOT NULL CHECK (kind IN ('story', 'comment', 'job')),
    author  TEXT NOT NULL
            REFERENCES users(id) ON DELETE CASCADE ON UPDATE CASCADE,
    time    INTEGER NOT NULL,           -- Unix milliseconds
    text    TEXT,
    url     TEXT,
    title   TEXT,
    parent  INTEGER REFERENCES items(id) ON DELETE CASCADE,
    score   INTEGER NOT NULL DEFAULT 0 CHECK (score >= 0),
    deleted INTEGER NOT NULL DEFAULT 0,
    dead    INTEGER NOT NULL DEFAULT 0,
    CHECK (kind != 'comment' OR (parent IS NOT NULL AND text IS NOT NULL)),
    CHECK (kind = 'comment' OR url IS NOT NULL)
);

-- One row per (user, item). Voters need not be registered users.
CREATE TABLE IF NOT EXISTS upvotes (
    id      INTEGER PRIMARY KEY,
    user_id TEXT NOT NULL,
    item_id INTEGER NOT NULL REFERENCES items(id) ON DELETE CASCADE,
    time    INTEGER NOT NULL,
    UNIQUE (user_id, item_id)
);

CREATE TABLE IF NOT EXISTS favorites (
    id      INTEGER PRIMARY KEY,
    user_id TEXT NOT NULL,
    item_id INTEGER NOT NULL REFERENCES items(id) ON DELETE CASCADE,
    time    INTEGER NOT NULL,
    UNIQUE (user_id, item_id)
);

-- Append-only. No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS game_scores (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id    TEXT NOT NULL
               REFERENCES users(id) ON DELETE CASCADE ON UPDATE CASCADE,
    game_type  TEXT NOT NULL CHECK (game_type IN ('2048', 'snake', 'flappybird')),
    score      INTEGER NOT NULL,
    time       INTEGER NOT NULL,
    stats_json TEXT NOT NULL DEFAULT '{}'   -- game-specific fields only
);

CREATE INDEX IF NOT EXISTS items_parent_idx   ON items(parent);
CREATE INDEX IF NOT EXISTS items_author_idx   ON items(author, time);
CREATE INDEX IF NOT EXISTS items_listing_idx  ON items(kind, deleted, dead, score);
CREATE INDEX IF NOT EXISTS upvotes_item_idx   ON upvotes(item_id);
CREATE INDEX IF NOT EXISTS favorites_item_idx ON favorites(item_id);
CREATE INDEX IF NOT EXISTS favorites_user_idx ON favorites(user_id, time);
CREATE INDEX IF NOT EXISTS game_scores_idx    ON game_scores(game_type, score);

PRAGMA user_version = 1;
";
