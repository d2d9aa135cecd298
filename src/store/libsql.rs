use anyhow::Result;
use libsql::{Builder, Connection, Database as LibsqlDatabase};
use std::path::Path;
use std::time::Duration;

use super::{BookStore, DeleteAll, StoreResult};
use crate::config::App;
use crate::error::StoreError;
use crate::model::{BookId, BookRecord, BookSummary};

const SYSTEM_MIGRATIONS: &[(&str, &str)] = &[(
    "system/000_migrations_table.sql",
    include_str!("../migrations/system/000_migrations_table.sql"),
)];

const MIGRATIONS: &[(&str, &str)] = &[("001_books.sql", include_str!("../migrations/001_books.sql"))];

const BOOK_COLUMNS: &str = "id, title, comments, commentcount";

/// Book records as rows of a single `books` table, comments kept as a JSON array.
pub struct LibsqlStore {
    db: LibsqlDatabase,
    conn: Connection,
    replica: bool,
}

impl LibsqlStore {
    pub fn is_replica(turso_url: &Option<String>, turso_auth_token: &Option<String>) -> bool {
        turso_url.is_some() && turso_auth_token.is_some()
    }

    /// Opens the database named in the config, relative to `data_dir`.
    pub async fn new(app: &App, data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(app.get_db());
        let turso_url = app.turso_url();
        let turso_auth_token = app.turso_auth_token();

        let db = match (&turso_url, &turso_auth_token) {
            (Some(url), Some(token)) => {
                tracing::info!("[db] running in synced database mode (offline writes)");
                let sync_interval = Duration::from_secs(app.sync_interval_seconds);
                Builder::new_synced_database(&path, url.clone(), token.clone())
                    .sync_interval(sync_interval)
                    .build()
                    .await?
            }
            _ => Builder::new_local(&path).build().await?,
        };

        Self::setup(db, Self::is_replica(&turso_url, &turso_auth_token)).await
    }

    pub async fn open_local(path: &Path) -> Result<Self> {
        let db = Builder::new_local(path).build().await?;
        Self::setup(db, false).await
    }

    async fn setup(db: LibsqlDatabase, replica: bool) -> Result<Self> {
        let conn = db.connect()?;
        conn.query("SELECT 1", ()).await?;

        for (filename, sql) in SYSTEM_MIGRATIONS.iter().chain(MIGRATIONS) {
            Self::run_migration(&conn, filename, sql).await?;
        }

        Ok(LibsqlStore { db, conn, replica })
    }

    pub async fn sync(&self) -> Result<()> {
        if self.replica {
            self.db
                .sync()
                .await
                .map_err(|e| anyhow::anyhow!("sync failed: {}", e))?;
        }
        Ok(())
    }

    async fn is_migration_applied(conn: &Connection, name: &str) -> Result<bool> {
        let query = "SELECT 1 FROM _migrations WHERE name = ?";
        match conn.query(query, libsql::params![name]).await {
            Ok(mut rows) => Ok(rows.next().await?.is_some()),
            Err(e) => {
                if e.to_string().contains("no such table") {
                    Ok(false)
                } else {
                    Err(e.into())
                }
            }
        }
    }

    async fn record_migration(conn: &Connection, name: &str) -> Result<()> {
        let query = r#"
            INSERT INTO _migrations (name, applied_at)
            VALUES (?, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        "#;
        conn.execute(query, libsql::params![name]).await?;
        Ok(())
    }

    async fn run_migration(conn: &Connection, name: &str, sql: &str) -> Result<()> {
        if Self::is_migration_applied(conn, name).await? {
            tracing::debug!("migration {} already applied, skipping", name);
            return Ok(());
        }

        tracing::info!("applying migration: {}", name);
        conn.execute_batch(sql)
            .await
            .map_err(|e| anyhow::anyhow!("failed to execute migration {name}: {e}"))?;

        Self::record_migration(conn, name).await?;
        Ok(())
    }

    async fn query_one(&self, sql: &str, params: Vec<libsql::Value>) -> StoreResult<Option<BookRecord>> {
        let mut rows = self.conn.query(sql, params).await?;

        match rows.next().await? {
            Some(row) => Ok(Some(row_to_book(&row)?)),
            None => Ok(None),
        }
    }
}

fn row_to_book(row: &libsql::Row) -> StoreResult<BookRecord> {
    let id = BookId::parse(&row.get::<String>(0)?)?;
    let comments_json: String = row.get(2)?;
    let comments: Vec<String> = serde_json::from_str(&comments_json).map_err(|source| StoreError::Corrupt {
        id: id.to_string(),
        source,
    })?;

    Ok(BookRecord {
        id,
        title: row.get(1)?,
        comments,
        comment_count: row.get(3)?,
    })
}

#[async_trait::async_trait]
impl BookStore for LibsqlStore {
    async fn insert(&self, title: &str) -> StoreResult<BookRecord> {
        let query = format!(
            "INSERT INTO books (id, title, comments, commentcount) VALUES (?, ?, '[]', 0) RETURNING {BOOK_COLUMNS}"
        );
        let id = BookId::generate();

        self.query_one(&query, vec![id.to_string().into(), title.to_string().into()])
            .await?
            .ok_or(StoreError::Missing("insert"))
    }

    async fn find_all(&self) -> StoreResult<Vec<BookSummary>> {
        let query = "SELECT id, title, commentcount FROM books ORDER BY rowid";
        let mut rows = self.conn.query(query, ()).await?;
        let mut books = Vec::new();

        while let Some(row) = rows.next().await? {
            books.push(BookSummary {
                id: BookId::parse(&row.get::<String>(0)?)?,
                title: row.get(1)?,
                comment_count: row.get(2)?,
            });
        }

        Ok(books)
    }

    async fn find_by_id(&self, id: &BookId) -> StoreResult<Option<BookRecord>> {
        let query = format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = ?");
        self.query_one(&query, vec![id.to_string().into()]).await
    }

    async fn save(&self, book: &BookRecord) -> StoreResult<Option<BookRecord>> {
        let comments_json = serde_json::to_string(&book.comments).map_err(|source| StoreError::Corrupt {
            id: book.id.to_string(),
            source,
        })?;
        let query = format!(
            r#"
            UPDATE books
            SET title = ?, comments = ?, commentcount = ?,
                updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
            WHERE id = ?
            RETURNING {BOOK_COLUMNS}
            "#
        );

        self.query_one(
            &query,
            vec![
                book.title.clone().into(),
                comments_json.into(),
                book.comment_count.into(),
                book.id.to_string().into(),
            ],
        )
        .await
    }

    async fn delete_by_id(&self, id: &BookId) -> StoreResult<Option<BookRecord>> {
        let query = format!("DELETE FROM books WHERE id = ? RETURNING {BOOK_COLUMNS}");
        self.query_one(&query, vec![id.to_string().into()]).await
    }

    async fn delete_all(&self) -> StoreResult<DeleteAll> {
        let deleted = self.conn.execute("DELETE FROM books", ()).await?;
        Ok(DeleteAll {
            acknowledged: true,
            deleted,
        })
    }
}
