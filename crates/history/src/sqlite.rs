//! SQLite history backend.
//!
//! Uses a single SQLite database file with one `turns` table. The integer
//! primary key (`iid`) is the insertion sequence: `recent(n)` selects the
//! last `n` rows by `iid` and returns them chronologically, so replay
//! order never depends on clock resolution.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use studylab_core::error::HistoryError;
use studylab_core::history::HistoryStore;
use studylab_core::turn::{ConversationId, Role, Turn};
use tracing::{debug, info};

/// A persistent SQLite history backend.
pub struct SqliteHistory {
    pool: SqlitePool,
}

impl SqliteHistory {
    /// Create a new SQLite backend from a file path.
    ///
    /// The database and its tables/indexes are created automatically.
    /// Pass `":memory:"` for an in-process ephemeral database (useful for
    /// tests; pinned to one connection so every query sees the same data).
    pub async fn new(path: &str) -> Result<Self, HistoryError> {
        let options = SqliteConnectOptions::from_str(path)
            .map_err(|e| HistoryError::Unavailable(format!("Invalid SQLite path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .pragma("foreign_keys", "ON");

        let max_connections = if path.contains(":memory:") { 1 } else { 4 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| HistoryError::Unavailable(format!("Failed to open SQLite: {e}")))?;

        let backend = Self { pool };
        backend.run_migrations().await?;
        info!("SQLite history backend initialized at {path}");
        Ok(backend)
    }

    /// Run schema migrations — creates the turns table and its index.
    async fn run_migrations(&self) -> Result<(), HistoryError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS turns (
                iid             INTEGER PRIMARY KEY AUTOINCREMENT,
                id              TEXT UNIQUE NOT NULL,
                conversation_id TEXT NOT NULL,
                role            TEXT NOT NULL,
                content         TEXT NOT NULL,
                created_at      TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| HistoryError::MigrationFailed(format!("turns table: {e}")))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_turns_conversation ON turns(conversation_id, iid)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| HistoryError::MigrationFailed(format!("conversation index: {e}")))?;

        debug!("SQLite migrations complete");
        Ok(())
    }

    fn role_to_str(role: Role) -> &'static str {
        match role {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    fn role_from_str(s: &str) -> Result<Role, HistoryError> {
        match s {
            "system" => Ok(Role::System),
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(HistoryError::QueryFailed(format!("unknown role '{other}'"))),
        }
    }

    /// Parse a `Turn` from a SQLite row.
    fn row_to_turn(row: &sqlx::sqlite::SqliteRow) -> Result<Turn, HistoryError> {
        let id: String = row
            .try_get("id")
            .map_err(|e| HistoryError::QueryFailed(format!("id column: {e}")))?;
        let role_str: String = row
            .try_get("role")
            .map_err(|e| HistoryError::QueryFailed(format!("role column: {e}")))?;
        let content: String = row
            .try_get("content")
            .map_err(|e| HistoryError::QueryFailed(format!("content column: {e}")))?;
        let created_at_str: String = row
            .try_get("created_at")
            .map_err(|e| HistoryError::QueryFailed(format!("created_at column: {e}")))?;

        let created_at = chrono::DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| HistoryError::QueryFailed(format!("created_at parse: {e}")))?;

        Ok(Turn {
            id,
            role: Self::role_from_str(&role_str)?,
            content,
            created_at,
        })
    }
}

#[async_trait]
impl HistoryStore for SqliteHistory {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn append(&self, conversation: &ConversationId, turn: Turn) -> Result<(), HistoryError> {
        sqlx::query(
            r#"
            INSERT INTO turns (id, conversation_id, role, content, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&turn.id)
        .bind(&conversation.0)
        .bind(Self::role_to_str(turn.role))
        .bind(&turn.content)
        .bind(turn.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| HistoryError::Unavailable(format!("INSERT failed: {e}")))?;

        debug!(conversation = %conversation, turn = %turn.id, "Appended turn");
        Ok(())
    }

    async fn recent(
        &self,
        conversation: &ConversationId,
        n: usize,
    ) -> Result<Vec<Turn>, HistoryError> {
        if n == 0 {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(
            r#"
            SELECT id, role, content, created_at
            FROM turns
            WHERE conversation_id = ?1
            ORDER BY iid DESC
            LIMIT ?2
            "#,
        )
        .bind(&conversation.0)
        .bind(n as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| HistoryError::QueryFailed(format!("recent query: {e}")))?;

        let mut turns: Vec<Turn> = rows
            .iter()
            .map(Self::row_to_turn)
            .collect::<Result<_, _>>()?;

        // Rows come newest-first; restore chronological order.
        turns.reverse();
        Ok(turns)
    }

    async fn count(&self, conversation: &ConversationId) -> Result<usize, HistoryError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM turns WHERE conversation_id = ?1")
            .bind(&conversation.0)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| HistoryError::QueryFailed(format!("count query: {e}")))?;

        let n: i64 = row
            .try_get("n")
            .map_err(|e| HistoryError::QueryFailed(format!("count column: {e}")))?;
        Ok(n as usize)
    }
}
