// username/password accounts
// registration and credential checks only, nothing issues sessions

use crate::Error;
use crate::core::db::Store;
use crate::core::model::{User, now_timestamp};
use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

impl Store {
    pub async fn register(&self, username: &str, password: &str) -> Result<User, Error> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(Error::EmptyCredentials);
        }

        let password_hash = hash_password(password)?;
        let created_at = now_timestamp();

        let result = sqlx::query(
            "INSERT INTO users (username, password_hash, created_at) VALUES (?, ?, ?)",
        )
        .bind(username)
        .bind(&password_hash)
        .bind(&created_at)
        .execute(&self.pool)
        .await;

        let id = match result {
            Ok(done) => done.last_insert_rowid(),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                return Err(Error::UsernameTaken(username.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!(user_id = id, "user registered");

        Ok(User {
            id,
            username: username.to_string(),
            created_at,
        })
    }

    // unknown user and wrong password look the same to the caller
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, Error> {
        let row: Option<(i64, String, String, String)> = sqlx::query_as(
            "SELECT id, username, password_hash, created_at FROM users WHERE username = ?",
        )
        .bind(username.trim())
        .fetch_optional(&self.pool)
        .await?;

        let Some((id, username, password_hash, created_at)) = row else {
            return Err(Error::InvalidCredentials);
        };

        if !verify_password(password, &password_hash)? {
            tracing::warn!(user_id = id, "failed login");
            return Err(Error::InvalidCredentials);
        }

        Ok(User {
            id,
            username,
            created_at,
        })
    }
}

fn hash_password(password: &str) -> Result<String, Error> {
    let salt = SaltString::generate(&mut argon2::password_hash::rand_core::OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| Error::PasswordHash(e.to_string()))?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, hash: &str) -> Result<bool, Error> {
    let parsed = PasswordHash::new(hash).map_err(|e| Error::PasswordHash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
