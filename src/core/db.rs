// content store - posts and comments in a single sqlite file

use crate::Error;
use crate::core::model::{
    Comment, NewComment, NewPost, Post, PostFilter, Role, normalize_body, normalize_nickname,
    normalize_share_code, now_timestamp,
};
use crate::core::share::generate_share_code;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use std::str::FromStr;

const SCHEMA: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS posts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        created_at TEXT NOT NULL,
        role TEXT NOT NULL,
        nickname TEXT,
        is_anonymous INTEGER NOT NULL DEFAULT 1,
        category TEXT NOT NULL,
        content TEXT NOT NULL,
        hearts INTEGER NOT NULL DEFAULT 0,
        is_flagged INTEGER NOT NULL DEFAULT 0,
        share_code TEXT
    )"#,
    r#"CREATE TABLE IF NOT EXISTS comments (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        post_id INTEGER NOT NULL,
        created_at TEXT NOT NULL,
        role TEXT NOT NULL,
        nickname TEXT,
        is_anonymous INTEGER NOT NULL DEFAULT 1,
        content TEXT NOT NULL,
        FOREIGN KEY(post_id) REFERENCES posts(id) ON DELETE CASCADE
    )"#,
    r#"CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        created_at TEXT NOT NULL
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_comments_post_id ON comments(post_id)",
    "CREATE INDEX IF NOT EXISTS idx_posts_share_code ON posts(share_code)",
];

const POST_COLUMNS: &str =
    "id, created_at, role, nickname, is_anonymous, category, content, hearts, is_flagged, share_code";
const COMMENT_COLUMNS: &str = "id, post_id, created_at, role, nickname, is_anonymous, content";

#[derive(Clone)]
pub struct Store {
    pub(crate) pool: SqlitePool,
    location: String,
}

impl Store {
    /// Opens (and creates if needed) the database. Accepts a `sqlite:` url or a
    /// plain file path.
    pub async fn connect(target: &str) -> Result<Self, Error> {
        let options = if target.starts_with("sqlite:") {
            SqliteConnectOptions::from_str(target)?
        } else {
            SqliteConnectOptions::new().filename(target)
        }
        .create_if_missing(true)
        .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let store = Self {
            pool,
            location: target.to_string(),
        };
        store.init().await?;

        tracing::debug!(location = %store.location, "store ready");
        Ok(store)
    }

    // every connection to :memory: is its own database, so pin the pool to one
    pub async fn in_memory() -> Result<Self, Error> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let store = Self {
            pool,
            location: ":memory:".to_string(),
        };
        store.init().await?;
        Ok(store)
    }

    async fn init(&self) -> Result<(), Error> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub async fn create_post(&self, new: NewPost) -> Result<Post, Error> {
        let content = normalize_body(&new.content)?;
        let nickname = normalize_nickname(new.author.nickname.as_deref())?;
        let share_code = new.with_share_code.then(generate_share_code);
        let created_at = now_timestamp();

        let id = sqlx::query(
            "INSERT INTO posts (created_at, role, nickname, is_anonymous, category, content, share_code)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&created_at)
        .bind(new.author.role.key())
        .bind(&nickname)
        .bind(new.author.is_anonymous)
        .bind(new.category.key())
        .bind(&content)
        .bind(&share_code)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        tracing::info!(post_id = id, category = new.category.key(), "post created");

        Ok(Post {
            id,
            created_at,
            role: new.author.role,
            nickname,
            is_anonymous: new.author.is_anonymous,
            category: new.category,
            content,
            hearts: 0,
            is_flagged: false,
            share_code,
        })
    }

    pub async fn create_comment(&self, new: NewComment) -> Result<Comment, Error> {
        let content = normalize_body(&new.content)?;
        let nickname = normalize_nickname(new.author.nickname.as_deref())?;
        self.ensure_post(new.post_id).await?;
        let created_at = now_timestamp();

        let id = sqlx::query(
            "INSERT INTO comments (post_id, created_at, role, nickname, is_anonymous, content)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(new.post_id)
        .bind(&created_at)
        .bind(new.author.role.key())
        .bind(&nickname)
        .bind(new.author.is_anonymous)
        .bind(&content)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        tracing::info!(comment_id = id, post_id = new.post_id, "comment created");

        Ok(Comment {
            id,
            post_id: new.post_id,
            created_at,
            role: new.author.role,
            nickname,
            is_anonymous: new.author.is_anonymous,
            content,
        })
    }

    /// Newest first.
    pub async fn list_posts(&self, filter: &PostFilter) -> Result<Vec<Post>, Error> {
        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {POST_COLUMNS} FROM posts WHERE 1=1"));

        if let Some(category) = filter.category {
            query.push(" AND category = ").push_bind(category.key());
        }
        if let Some(role) = filter.role {
            query.push(" AND role = ").push_bind(role.key());
        }
        if let Some(code) = filter.share_code.as_deref().filter(|c| !c.trim().is_empty()) {
            query
                .push(" AND share_code = ")
                .push_bind(normalize_share_code(code));
        }
        if let Some(text) = filter.text.as_deref().filter(|t| !t.trim().is_empty()) {
            query
                .push(" AND content LIKE ")
                .push_bind(format!("%{}%", text.trim()));
        }
        query.push(" ORDER BY id DESC");

        let rows = query.build().fetch_all(&self.pool).await?;
        rows.iter().map(post_from_row).collect()
    }

    pub async fn get_post(&self, id: i64) -> Result<Post, Error> {
        let row = sqlx::query(&format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(Error::PostNotFound(id))?;

        post_from_row(&row)
    }

    // codes are not unique, the newest post wins
    pub async fn find_by_share_code(&self, code: &str) -> Result<Post, Error> {
        let code = normalize_share_code(code);
        let row = sqlx::query(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE share_code = ? ORDER BY id DESC LIMIT 1"
        ))
        .bind(&code)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(Error::ShareCodeNotFound(code))?;

        post_from_row(&row)
    }

    /// Oldest first.
    pub async fn list_comments(&self, post_id: i64) -> Result<Vec<Comment>, Error> {
        let rows = sqlx::query(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE post_id = ? ORDER BY id ASC"
        ))
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(comment_from_row).collect()
    }

    /// Adds one heart and returns the new total.
    pub async fn increment_heart(&self, id: i64) -> Result<i64, Error> {
        let hearts: i64 =
            sqlx::query_scalar("UPDATE posts SET hearts = hearts + 1 WHERE id = ? RETURNING hearts")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or(Error::PostNotFound(id))?;

        tracing::debug!(post_id = id, hearts, "heart added");
        Ok(hearts)
    }

    pub async fn set_flagged(&self, id: i64) -> Result<(), Error> {
        let result = sqlx::query("UPDATE posts SET is_flagged = 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::PostNotFound(id));
        }

        tracing::warn!(post_id = id, "post flagged for review");
        Ok(())
    }

    /// Removes a post together with its comments.
    pub async fn delete_post(&self, id: i64) -> Result<(), Error> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::PostNotFound(id));
        }

        tracing::info!(post_id = id, "post deleted");
        Ok(())
    }

    pub async fn count_posts(&self) -> Result<i64, Error> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn ensure_post(&self, id: i64) -> Result<(), Error> {
        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM posts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        exists.map(|_| ()).ok_or(Error::PostNotFound(id))
    }
}

// rows written by older builds may carry role text we no longer know
fn post_from_row(row: &SqliteRow) -> Result<Post, Error> {
    let role: String = row.try_get("role")?;
    let category: String = row.try_get("category")?;
    let is_anonymous: i64 = row.try_get("is_anonymous")?;
    let is_flagged: i64 = row.try_get("is_flagged")?;

    Ok(Post {
        id: row.try_get("id")?,
        created_at: row.try_get("created_at")?,
        role: Role::sanitize(&role),
        nickname: row.try_get("nickname")?,
        is_anonymous: is_anonymous != 0,
        category: category.parse()?,
        content: row.try_get("content")?,
        hearts: row.try_get("hearts")?,
        is_flagged: is_flagged != 0,
        share_code: row.try_get("share_code")?,
    })
}

fn comment_from_row(row: &SqliteRow) -> Result<Comment, Error> {
    let role: String = row.try_get("role")?;
    let is_anonymous: i64 = row.try_get("is_anonymous")?;

    Ok(Comment {
        id: row.try_get("id")?,
        post_id: row.try_get("post_id")?,
        created_at: row.try_get("created_at")?,
        role: Role::sanitize(&role),
        nickname: row.try_get("nickname")?,
        is_anonymous: is_anonymous != 0,
        content: row.try_get("content")?,
    })
}
