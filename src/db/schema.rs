//! Database schema definitions.
//!
//! Each entry of `MIGRATIONS` is applied once, in order. Never edit a
//! migration that has shipped; append a new one instead.

/// Ordered list of schema migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: users
    r#"
CREATE TABLE users (
    id                              INTEGER PRIMARY KEY AUTOINCREMENT,
    username                        TEXT NOT NULL COLLATE NOCASE UNIQUE
                                        CHECK (length(username) BETWEEN 3 AND 20),
    email                           TEXT NOT NULL COLLATE NOCASE UNIQUE,
    password_hash                   TEXT NOT NULL,
    avatar_url                      TEXT NOT NULL DEFAULT ''
                                        CHECK (length(avatar_url) <= 500),
    role                            TEXT NOT NULL DEFAULT 'user'
                                        CHECK (role IN ('user', 'admin')),
    email_verified                  INTEGER NOT NULL DEFAULT 0,
    email_verification_token        TEXT,
    email_verification_expires_at   TEXT,
    created_at                      TEXT NOT NULL
);

CREATE INDEX idx_users_verification_token ON users(email_verification_token);
"#,
    // v2: wall messages
    r#"
CREATE TABLE messages (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    author_id   INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    content     TEXT NOT NULL CHECK (length(content) BETWEEN 1 AND 280),
    created_at  TEXT NOT NULL
);

CREATE INDEX idx_messages_created ON messages(created_at DESC, id DESC);
"#,
    // v3: forums, threads and posts
    r#"
CREATE TABLE forums (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    slug        TEXT NOT NULL UNIQUE CHECK (length(slug) BETWEEN 1 AND 40),
    title       TEXT NOT NULL CHECK (length(title) BETWEEN 3 AND 40),
    description TEXT NOT NULL DEFAULT '' CHECK (length(description) <= 140),
    created_by  INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    created_at  TEXT NOT NULL
);

CREATE TABLE threads (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    forum_id     INTEGER NOT NULL REFERENCES forums(id) ON DELETE CASCADE,
    title        TEXT NOT NULL CHECK (length(title) BETWEEN 3 AND 80),
    created_by   INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    created_at   TEXT NOT NULL,
    last_post_at TEXT,
    CHECK (last_post_at IS NULL OR last_post_at >= created_at)
);

CREATE INDEX idx_threads_forum_activity
    ON threads(forum_id, COALESCE(last_post_at, created_at) DESC, id DESC);

CREATE TABLE posts (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    thread_id   INTEGER NOT NULL REFERENCES threads(id) ON DELETE CASCADE,
    author_id   INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    content     TEXT NOT NULL CHECK (length(content) BETWEEN 1 AND 2000),
    created_at  TEXT NOT NULL
);

CREATE INDEX idx_posts_thread ON posts(thread_id, created_at, id);
"#,
];
