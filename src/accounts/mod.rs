//! Credential store: registration, login, and opaque bearer tokens over SQLite.
//!
//! SQL and Argon2 work both run on blocking workers, but the connection lock is
//! never held while hashing. Only Argon2 hashes of passwords and blake3
//! digests of tokens are written to disk.

pub mod password;

use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use crate::error::{PersonaError, Result};
use password::PasswordHashing;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    username      TEXT NOT NULL,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    created_at    TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS access_tokens (
    token_digest  TEXT PRIMARY KEY,
    email         TEXT NOT NULL REFERENCES users(email),
    issued_at     TEXT NOT NULL
);
";

/// Live tokens kept per account; the oldest are dropped on each login.
pub const MAX_TOKENS_PER_ACCOUNT: i64 = 5;

/// Public view of a stored account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Successful login: the account plus a freshly issued bearer token.
#[derive(Debug, Clone)]
pub struct LoginGrant {
    pub account: Account,
    pub access_token: String,
}

#[derive(Clone)]
pub struct AccountStore {
    conn: Arc<Mutex<Connection>>,
    hashing: PasswordHashing,
}

impl AccountStore {
    pub fn open(path: &Path, hashing: PasswordHashing) -> Result<Self> {
        let conn = Connection::open(path)?;
        info!("Opened account store at {}", path.display());
        Self::with_connection(conn, hashing)
    }

    pub fn open_in_memory(hashing: PasswordHashing) -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?, hashing)
    }

    fn with_connection(conn: Connection, hashing: PasswordHashing) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            hashing,
        })
    }

    /// Run `f` against the connection on the blocking pool. Keep `f` to
    /// SQL only; the lock is held until it returns.
    async fn blocking<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock().map_err(|_| PersonaError::Internal {
                message: "account store lock poisoned".to_string(),
            })?;
            f(&mut *guard)
        })
        .await?
    }

    /// Run Argon2 work on the blocking pool without touching the connection.
    async fn hashing<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&PasswordHashing) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let hashing = self.hashing.clone();
        tokio::task::spawn_blocking(move || f(&hashing)).await?
    }

    pub async fn register(&self, registration: Registration) -> Result<Account> {
        let username = registration.username.trim().to_string();
        let email = registration.email.trim().to_string();
        if username.is_empty() {
            return Err(PersonaError::validation("username is required"));
        }
        if email.is_empty() {
            return Err(PersonaError::validation("email is required"));
        }
        if registration.password.is_empty() {
            return Err(PersonaError::validation("password is required"));
        }
        let password = registration.password;
        let password_hash = self.hashing(move |hashing| hashing.hash(&password)).await?;

        let account = self
            .blocking(move |conn| {
                let tx = conn.transaction()?;
                let exists = tx
                    .query_row("SELECT 1 FROM users WHERE email = ?1", params![email], |_| {
                        Ok(())
                    })
                    .optional()?
                    .is_some();
                if exists {
                    return Err(PersonaError::DuplicateAccount);
                }

                tx.execute(
                    "INSERT INTO users (username, email, password_hash, created_at)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![
                        username,
                        email,
                        password_hash,
                        chrono::Utc::now().to_rfc3339()
                    ],
                )
                .map_err(map_unique_violation)?;
                tx.commit()?;

                Ok(Account { username, email })
            })
            .await?;

        info!("Registered account {}", account.email);
        Ok(account)
    }

    pub async fn login(&self, credentials: Credentials) -> Result<LoginGrant> {
        let email = credentials.email.trim().to_string();
        let password = credentials.password;

        let lookup = email.clone();
        let row: Option<(String, String)> = self
            .blocking(move |conn| {
                Ok(conn
                    .query_row(
                        "SELECT username, password_hash FROM users WHERE email = ?1",
                        params![lookup],
                        |row| Ok((row.get(0)?, row.get(1)?)),
                    )
                    .optional()?)
            })
            .await?;

        // Unknown emails still pay for one verification.
        let stored = row.as_ref().map(|(_, hash)| hash.clone());
        let verified = self
            .hashing(move |hashing| hashing.verify_stored(&password, stored.as_deref()))
            .await?;
        let Some((username, _)) = row else {
            debug!("Login rejected: unknown email");
            return Err(PersonaError::InvalidCredentials);
        };
        if !verified {
            debug!("Login rejected: password mismatch");
            return Err(PersonaError::InvalidCredentials);
        }

        let access_token = uuid::Uuid::new_v4().simple().to_string();
        let digest = token_digest(&access_token);
        let owner = email.clone();
        self.blocking(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO access_tokens (token_digest, email, issued_at) VALUES (?1, ?2, ?3)",
                params![digest, owner, chrono::Utc::now().to_rfc3339()],
            )?;
            let pruned = tx.execute(
                "DELETE FROM access_tokens WHERE email = ?1 AND rowid NOT IN (
                     SELECT rowid FROM access_tokens WHERE email = ?1
                     ORDER BY rowid DESC LIMIT ?2
                 )",
                params![owner, MAX_TOKENS_PER_ACCOUNT],
            )?;
            tx.commit()?;
            if pruned > 0 {
                debug!("Pruned {} old access tokens for {}", pruned, owner);
            }
            Ok(())
        })
        .await?;

        info!("Issued access token for {}", email);
        Ok(LoginGrant {
            account: Account { username, email },
            access_token,
        })
    }

    /// Resolve a bearer token issued by [`AccountStore::login`].
    pub async fn account_for_token(&self, token: &str) -> Result<Account> {
        let digest = token_digest(token.trim());
        self.blocking(move |conn| {
            conn.query_row(
                "SELECT u.username, u.email FROM access_tokens t
                 JOIN users u ON u.email = t.email
                 WHERE t.token_digest = ?1",
                params![digest],
                |row| {
                    Ok(Account {
                        username: row.get(0)?,
                        email: row.get(1)?,
                    })
                },
            )
            .optional()?
            .ok_or(PersonaError::InvalidCredentials)
        })
        .await
    }
}

fn token_digest(token: &str) -> String {
    blake3::hash(token.as_bytes()).to_hex().to_string()
}

/// A concurrent insert that lost the race on `email` is still a duplicate.
fn map_unique_violation(err: rusqlite::Error) -> PersonaError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation => {
            PersonaError::DuplicateAccount
        }
        _ => err.into(),
    }
}
