//! SQLite schema for linkboard
//!
//! Three tables: users, links, votes. Referential integrity and the
//! vote-uniqueness invariant live in the schema itself rather than in
//! application code, so they hold under any caller interleaving.

use rusqlite::{Connection, Result};

/// Current schema version for migrations
pub const SCHEMA_VERSION: i32 = 1;

/// Initialize the database schema
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Schema version tracking
        CREATE TABLE IF NOT EXISTS schema_info (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        -- Users table. Rows are provisioned by the identity layer;
        -- nothing in this crate updates them.
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            name TEXT UNIQUE NOT NULL,
            created_at INTEGER NOT NULL
        );

        -- Links table. posted_by is nullable: links may exist without
        -- an attributed author.
        CREATE TABLE IF NOT EXISTS links (
            id TEXT PRIMARY KEY,
            url TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            posted_by TEXT,
            created_at INTEGER NOT NULL,
            FOREIGN KEY (posted_by) REFERENCES users(id) ON DELETE CASCADE
        );

        -- Votes table. link_id is nullable to match the link model, but
        -- deleting a link cascades to its votes, so orphan votes are
        -- never produced here. The unique index is the vote-uniqueness
        -- invariant: at most one vote per (user, link) pair.
        CREATE TABLE IF NOT EXISTS votes (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            link_id TEXT,
            created_at INTEGER NOT NULL,
            UNIQUE (user_id, link_id),
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
            FOREIGN KEY (link_id) REFERENCES links(id) ON DELETE CASCADE
        );

        -- Indexes for common query patterns

        -- Resolve a link's votes and vote count
        CREATE INDEX IF NOT EXISTS idx_votes_link_id ON votes(link_id);

        -- Resolve a user's votes (and speed up user cascade deletes)
        CREATE INDEX IF NOT EXISTS idx_votes_user_id ON votes(user_id);

        -- Resolve a user's links
        CREATE INDEX IF NOT EXISTS idx_links_posted_by ON links(posted_by);
        "#,
    )?;

    // Set schema version
    conn.execute(
        "INSERT OR REPLACE INTO schema_info (key, value) VALUES ('version', ?)",
        [SCHEMA_VERSION.to_string()],
    )?;

    Ok(())
}

/// Get the current schema version from the database
pub fn get_schema_version(conn: &Connection) -> Result<Option<i32>> {
    let mut stmt = conn.prepare("SELECT value FROM schema_info WHERE key = 'version'")?;
    let result: Result<String> = stmt.query_row([], |row| row.get(0));

    match result {
        Ok(version_str) => Ok(version_str.parse().ok()),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Check if schema needs initialization or migration
pub fn needs_init(conn: &Connection) -> bool {
    // Check if schema_info table exists
    let table_exists: bool = conn
        .prepare("SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_info'")
        .and_then(|mut stmt| stmt.exists([]))
        .unwrap_or(false);

    if !table_exists {
        return true;
    }

    match get_schema_version(conn) {
        Ok(Some(v)) => v < SCHEMA_VERSION,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        conn
    }

    #[test]
    fn test_init_schema() {
        let conn = open_test_conn();
        init_schema(&conn).unwrap();

        // Verify tables exist
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert!(tables.contains(&"users".to_string()));
        assert!(tables.contains(&"links".to_string()));
        assert!(tables.contains(&"votes".to_string()));
    }

    #[test]
    fn test_schema_version() {
        let conn = open_test_conn();

        // Before init, needs init
        assert!(needs_init(&conn));

        init_schema(&conn).unwrap();

        // After init, has version and doesn't need init
        assert_eq!(get_schema_version(&conn).unwrap(), Some(SCHEMA_VERSION));
        assert!(!needs_init(&conn));
    }

    #[test]
    fn test_init_schema_is_idempotent() {
        let conn = open_test_conn();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();

        assert_eq!(get_schema_version(&conn).unwrap(), Some(SCHEMA_VERSION));
    }

    #[test]
    fn test_indexes_exist() {
        let conn = open_test_conn();
        init_schema(&conn).unwrap();

        let indexes: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='index' AND name LIKE 'idx_%'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert!(indexes.contains(&"idx_votes_link_id".to_string()));
        assert!(indexes.contains(&"idx_votes_user_id".to_string()));
        assert!(indexes.contains(&"idx_links_posted_by".to_string()));
    }

    #[test]
    fn test_vote_uniqueness_constraint() {
        let conn = open_test_conn();
        init_schema(&conn).unwrap();

        conn.execute(
            "INSERT INTO users (id, name, created_at) VALUES ('u1', 'alice', 0)",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO links (id, url, description, posted_by, created_at)
             VALUES ('l1', 'https://a.com', '', 'u1', 0)",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO votes (id, user_id, link_id, created_at) VALUES ('v1', 'u1', 'l1', 0)",
            [],
        )
        .unwrap();

        // Second vote for the same (user, link) pair violates the unique index
        let result = conn.execute(
            "INSERT INTO votes (id, user_id, link_id, created_at) VALUES ('v2', 'u1', 'l1', 0)",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_link_delete_cascades_to_votes() {
        let conn = open_test_conn();
        init_schema(&conn).unwrap();

        conn.execute_batch(
            r#"
            INSERT INTO users (id, name, created_at) VALUES ('u1', 'alice', 0);
            INSERT INTO links (id, url, description, posted_by, created_at)
                VALUES ('l1', 'https://a.com', '', 'u1', 0);
            INSERT INTO votes (id, user_id, link_id, created_at) VALUES ('v1', 'u1', 'l1', 0);
            DELETE FROM links WHERE id = 'l1';
            "#,
        )
        .unwrap();

        let votes: i64 = conn
            .query_row("SELECT COUNT(*) FROM votes", [], |row| row.get(0))
            .unwrap();
        assert_eq!(votes, 0);
    }
}
