//! Unified storage interface
//!
//! The `Store` wraps a single SQLite connection behind a mutex, so every
//! operation runs serialized and is fully durable on return.
//!
//! ## Ordering
//!
//! All list queries return rows in creation order (rowid ascending), so
//! offset slicing and cursors behave predictably across requests.
//!
//! ## Usage
//!
//! ```ignore
//! let store = Store::open(&config)?;
//!
//! let user = store.ensure_user("alice")?;
//! let link = store.create_link("https://example.com", "", Some(user.id))?;
//! let vote = store.create_vote(user.id, link.id)?;
//! ```

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::config::Config;
use crate::models::{Link, User, Vote};
use crate::storage::schema::{init_schema, needs_init};
use crate::storage::{StoreError, StoreResult};

/// Unified storage interface for linkboard
///
/// The mutex serializes conflicting writes; in particular the vote
/// lookup-then-insert in [`Store::create_vote`] runs as one transaction
/// under the lock, with the schema's unique index as the backstop.
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Open the store at the location given by the configuration
    pub fn open(config: &Config) -> StoreResult<Self> {
        Self::open_at(config.sqlite_path())
    }

    /// Open or create the database at a specific path
    pub fn open_at(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        if needs_init(&conn) {
            init_schema(&conn)?;
        }
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        // A poisoned lock means a panic mid-statement; nothing to recover.
        self.conn.lock().expect("store mutex poisoned")
    }

    // ==================== User Operations ====================

    /// Create a new user
    ///
    /// Fails with [`StoreError::DuplicateUser`] if the name is taken.
    pub fn create_user(&self, name: &str) -> StoreResult<User> {
        let user = User::new(name);
        let result = self.conn().execute(
            "INSERT INTO users (id, name, created_at) VALUES (?, ?, ?)",
            params![
                user.id.to_string(),
                user.name,
                user.created_at.timestamp_millis()
            ],
        );

        match result {
            Ok(_) => {
                tracing::debug!(user = %user.id, name = %user.name, "created user");
                Ok(user)
            }
            Err(e) if is_constraint_violation(&e) => {
                Err(StoreError::DuplicateUser(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Get an existing user by name, creating one if absent
    pub fn ensure_user(&self, name: &str) -> StoreResult<User> {
        if let Some(user) = self.get_user_by_name(name)? {
            return Ok(user);
        }
        match self.create_user(name) {
            Ok(user) => Ok(user),
            // Lost the insert race to a concurrent first sight of the name
            Err(StoreError::DuplicateUser(taken)) => match self.get_user_by_name(name)? {
                Some(user) => Ok(user),
                None => Err(StoreError::DuplicateUser(taken)),
            },
            Err(e) => Err(e),
        }
    }

    /// Get a user by ID
    pub fn get_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        self.conn()
            .query_row(
                "SELECT id, name, created_at FROM users WHERE id = ?",
                params![id.to_string()],
                read_user,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Get a user by name
    pub fn get_user_by_name(&self, name: &str) -> StoreResult<Option<User>> {
        self.conn()
            .query_row(
                "SELECT id, name, created_at FROM users WHERE name = ?",
                params![name],
                read_user,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Delete a user
    ///
    /// Cascades to all links the user posted and all votes the user cast
    /// (and, transitively, to votes on the deleted links).
    pub fn delete_user(&self, id: Uuid) -> StoreResult<()> {
        let affected = self
            .conn()
            .execute("DELETE FROM users WHERE id = ?", params![id.to_string()])?;
        if affected == 0 {
            return Err(StoreError::UnknownUser(id));
        }
        tracing::debug!(user = %id, "deleted user");
        Ok(())
    }

    // ==================== Link Operations ====================

    /// Create a new link, optionally attributed to a user
    pub fn create_link(
        &self,
        url: &str,
        description: &str,
        posted_by: Option<Uuid>,
    ) -> StoreResult<Link> {
        let mut link = Link::new(url, description);
        link.posted_by = posted_by;

        let result = self.conn().execute(
            "INSERT INTO links (id, url, description, posted_by, created_at)
             VALUES (?, ?, ?, ?, ?)",
            params![
                link.id.to_string(),
                link.url,
                link.description,
                link.posted_by.map(|u| u.to_string()),
                link.created_at.timestamp_millis(),
            ],
        );

        match result {
            Ok(_) => {
                tracing::debug!(link = %link.id, url = %link.url, "created link");
                Ok(link)
            }
            // The only constraint on this insert is the posted_by foreign key
            Err(e) if is_constraint_violation(&e) => Err(StoreError::UnknownUser(
                posted_by.unwrap_or_default(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// Get a link by ID
    pub fn get_link(&self, id: Uuid) -> StoreResult<Option<Link>> {
        self.conn()
            .query_row(
                "SELECT id, url, description, posted_by, created_at FROM links WHERE id = ?",
                params![id.to_string()],
                read_link,
            )
            .optional()
            .map_err(Into::into)
    }

    /// List links in creation order, with optional search and slicing
    ///
    /// `search` keeps links whose URL **or** description contains the term
    /// (case-insensitive substring). `skip` drops the first N matches,
    /// then `first` takes at most N of the remainder; both are optional
    /// and compose independently.
    pub fn list_links(
        &self,
        search: Option<&str>,
        skip: Option<usize>,
        first: Option<usize>,
    ) -> StoreResult<Vec<Link>> {
        let conn = self.conn();
        // LIMIT -1 means unbounded in SQLite
        let limit = first.map(|n| n as i64).unwrap_or(-1);
        let offset = skip.unwrap_or(0) as i64;

        let mut links = Vec::new();
        match search {
            Some(term) => {
                let mut stmt = conn.prepare(
                    r"SELECT id, url, description, posted_by, created_at FROM links
                      WHERE url LIKE ?1 ESCAPE '\' OR description LIKE ?1 ESCAPE '\'
                      ORDER BY rowid ASC LIMIT ?2 OFFSET ?3",
                )?;
                let rows = stmt.query_map(params![like_pattern(term), limit, offset], read_link)?;
                for row in rows {
                    links.push(row?);
                }
            }
            None => {
                let mut stmt = conn.prepare(
                    "SELECT id, url, description, posted_by, created_at FROM links
                     ORDER BY rowid ASC LIMIT ?1 OFFSET ?2",
                )?;
                let rows = stmt.query_map(params![limit, offset], read_link)?;
                for row in rows {
                    links.push(row?);
                }
            }
        }

        Ok(links)
    }

    /// List links matching per-field substring filters, in creation order
    ///
    /// Distinct from [`Store::list_links`]: when both filters are given
    /// they compose as **and**, not or.
    pub fn filter_links(
        &self,
        url_contains: Option<&str>,
        description_contains: Option<&str>,
    ) -> StoreResult<Vec<Link>> {
        let mut sql =
            String::from("SELECT id, url, description, posted_by, created_at FROM links");
        let mut clauses = Vec::new();
        let mut patterns = Vec::new();

        if let Some(term) = url_contains {
            clauses.push(r"url LIKE ? ESCAPE '\'");
            patterns.push(like_pattern(term));
        }
        if let Some(term) = description_contains {
            clauses.push(r"description LIKE ? ESCAPE '\'");
            patterns.push(like_pattern(term));
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY rowid ASC");

        let conn = self.conn();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(patterns.iter()), read_link)?;

        let mut links = Vec::new();
        for row in rows {
            links.push(row?);
        }
        Ok(links)
    }

    /// Delete a link
    ///
    /// Cascades to all votes referencing it.
    pub fn delete_link(&self, id: Uuid) -> StoreResult<()> {
        let affected = self
            .conn()
            .execute("DELETE FROM links WHERE id = ?", params![id.to_string()])?;
        if affected == 0 {
            return Err(StoreError::UnknownLink(id));
        }
        tracing::debug!(link = %id, "deleted link");
        Ok(())
    }

    /// Get the total link count
    pub fn link_count(&self) -> StoreResult<i64> {
        self.conn()
            .query_row("SELECT COUNT(*) FROM links", [], |row| row.get(0))
            .map_err(Into::into)
    }

    // ==================== Vote Operations ====================

    /// Cast a vote by `user` on `link`
    ///
    /// The existence checks and the insert run in one transaction under
    /// the store lock, and the schema's unique index on (user, link)
    /// rejects duplicates even so; there are no partial effects.
    pub fn create_vote(&self, user: Uuid, link: Uuid) -> StoreResult<Vote> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let user_exists = tx
            .query_row(
                "SELECT 1 FROM users WHERE id = ?",
                params![user.to_string()],
                |_| Ok(()),
            )
            .optional()?;
        if user_exists.is_none() {
            return Err(StoreError::UnknownUser(user));
        }

        let link_exists = tx
            .query_row(
                "SELECT 1 FROM links WHERE id = ?",
                params![link.to_string()],
                |_| Ok(()),
            )
            .optional()?;
        if link_exists.is_none() {
            return Err(StoreError::UnknownLink(link));
        }

        let vote = Vote::new(user, link);
        let result = tx.execute(
            "INSERT INTO votes (id, user_id, link_id, created_at) VALUES (?, ?, ?, ?)",
            params![
                vote.id.to_string(),
                vote.user_id.to_string(),
                vote.link_id.map(|l| l.to_string()),
                vote.created_at.timestamp_millis(),
            ],
        );

        match result {
            Ok(_) => {
                tx.commit()?;
                tracing::debug!(vote = %vote.id, user = %user, link = %link, "created vote");
                Ok(vote)
            }
            Err(e) if is_constraint_violation(&e) => Err(StoreError::DuplicateVote { user, link }),
            Err(e) => Err(e.into()),
        }
    }

    /// Get a vote by ID
    pub fn get_vote(&self, id: Uuid) -> StoreResult<Option<Vote>> {
        self.conn()
            .query_row(
                "SELECT id, user_id, link_id, created_at FROM votes WHERE id = ?",
                params![id.to_string()],
                read_vote,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Find the vote cast by `user` on `link`, if any
    pub fn find_vote(&self, user: Uuid, link: Uuid) -> StoreResult<Option<Vote>> {
        self.conn()
            .query_row(
                "SELECT id, user_id, link_id, created_at FROM votes
                 WHERE user_id = ? AND link_id = ?",
                params![user.to_string(), link.to_string()],
                read_vote,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Get all votes in creation order
    pub fn all_votes(&self) -> StoreResult<Vec<Vote>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, user_id, link_id, created_at FROM votes ORDER BY rowid ASC",
        )?;
        let rows = stmt.query_map([], read_vote)?;

        let mut votes = Vec::new();
        for row in rows {
            votes.push(row?);
        }
        Ok(votes)
    }

    /// Get all votes on a link, in creation order
    pub fn votes_for_link(&self, link: Uuid) -> StoreResult<Vec<Vote>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, user_id, link_id, created_at FROM votes
             WHERE link_id = ? ORDER BY rowid ASC",
        )?;
        let rows = stmt.query_map(params![link.to_string()], read_vote)?;

        let mut votes = Vec::new();
        for row in rows {
            votes.push(row?);
        }
        Ok(votes)
    }

    /// Count the votes on a link
    pub fn vote_count(&self, link: Uuid) -> StoreResult<i64> {
        self.conn()
            .query_row(
                "SELECT COUNT(*) FROM votes WHERE link_id = ?",
                params![link.to_string()],
                |row| row.get(0),
            )
            .map_err(Into::into)
    }
}

// ==================== Row mapping ====================

fn read_user(row: &Row) -> rusqlite::Result<User> {
    let id: String = row.get(0)?;
    let name: String = row.get(1)?;
    let created_at: i64 = row.get(2)?;
    Ok(User::with_id(parse_uuid(0, &id)?, name, millis(created_at)))
}

fn read_link(row: &Row) -> rusqlite::Result<Link> {
    let id: String = row.get(0)?;
    let url: String = row.get(1)?;
    let description: String = row.get(2)?;
    let posted_by: Option<String> = row.get(3)?;
    let created_at: i64 = row.get(4)?;

    Ok(Link {
        id: parse_uuid(0, &id)?,
        url,
        description,
        posted_by: posted_by.as_deref().map(|s| parse_uuid(3, s)).transpose()?,
        created_at: millis(created_at),
    })
}

fn read_vote(row: &Row) -> rusqlite::Result<Vote> {
    let id: String = row.get(0)?;
    let user_id: String = row.get(1)?;
    let link_id: Option<String> = row.get(2)?;
    let created_at: i64 = row.get(3)?;

    Ok(Vote {
        id: parse_uuid(0, &id)?,
        user_id: parse_uuid(1, &user_id)?,
        link_id: link_id.as_deref().map(|s| parse_uuid(2, s)).transpose()?,
        created_at: millis(created_at),
    })
}

fn parse_uuid(idx: usize, value: &str) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(value).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn millis(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or_else(Utc::now)
}

/// Build a `%term%` LIKE pattern, escaping wildcard characters in the term
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

fn is_constraint_violation(error: &rusqlite::Error) -> bool {
    matches!(
        error,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}
