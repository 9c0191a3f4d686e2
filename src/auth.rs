//! User registration and login with salted Argon2 password hashes

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use log::{info, warn};
use rand::Rng;
use rusqlite::{params, ErrorCode, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::db::Database;
use crate::error::{QuizError, Result};
use crate::progress::UserId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
}

fn hash_password(password: &str) -> Result<String> {
    let salt_bytes: [u8; 16] = rand::thread_rng().gen();
    let salt = SaltString::encode_b64(&salt_bytes)?;
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            warn!("stored password hash is unreadable: {}", e);
            false
        }
    }
}

impl Database {
    /// Create a user. Fails with `DuplicateUser` if the name is taken.
    pub fn register(&self, username: &str, password: &str) -> Result<User> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(QuizError::InvalidCredentials);
        }
        let pw_hash = hash_password(password)?;

        let conn = self.conn();
        match conn.execute(
            "INSERT INTO users (username, password_hash) VALUES (?1, ?2)",
            params![username, pw_hash],
        ) {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == ErrorCode::ConstraintViolation =>
            {
                return Err(QuizError::DuplicateUser(username.to_string()));
            }
            Err(e) => return Err(e.into()),
        }
        let user = User {
            id: conn.last_insert_rowid(),
            username: username.to_string(),
        };
        info!("registered user '{}' (id {})", user.username, user.id);
        Ok(user)
    }

    /// Verify credentials. Unknown users and wrong passwords are
    /// indistinguishable to the caller.
    pub fn login(&self, username: &str, password: &str) -> Result<User> {
        let row = self
            .conn()
            .query_row(
                "SELECT id, username, password_hash FROM users WHERE username = ?1",
                params![username.trim()],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;

        match row {
            Some((id, username, stored)) if verify_password(password, &stored) => {
                Ok(User { id, username })
            }
            _ => Err(QuizError::InvalidCredentials),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_then_login() {
        let db = Database::open_in_memory().unwrap();
        let user = db.register("hanako", "sakura").unwrap();
        assert_eq!(db.login("hanako", "sakura").unwrap(), user);
    }

    #[test]
    fn duplicate_username_rejected() {
        let db = Database::open_in_memory().unwrap();
        db.register("taro", "pw1").unwrap();
        let err = db.register("taro", "pw2").unwrap_err();
        assert!(matches!(err, QuizError::DuplicateUser(name) if name == "taro"));
        // first password still valid
        assert!(db.login("taro", "pw1").is_ok());
    }

    #[test]
    fn login_failures_look_the_same() {
        let db = Database::open_in_memory().unwrap();
        db.register("taro", "pw1").unwrap();
        let wrong_pw = db.login("taro", "nope").unwrap_err();
        let no_user = db.login("jiro", "pw1").unwrap_err();
        assert!(matches!(wrong_pw, QuizError::InvalidCredentials));
        assert!(matches!(no_user, QuizError::InvalidCredentials));
        assert_eq!(wrong_pw.to_string(), no_user.to_string());
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("same").unwrap();
        let b = hash_password("same").unwrap();
        assert_ne!(a, b);
        assert!(verify_password("same", &a));
        assert!(!verify_password("other", &a));
        assert!(!verify_password("same", "not-a-phc-string"));
    }

    #[test]
    fn blank_credentials_rejected() {
        let db = Database::open_in_memory().unwrap();
        assert!(matches!(db.register("  ", "pw"), Err(QuizError::InvalidCredentials)));
        assert!(matches!(db.register("ken", ""), Err(QuizError::InvalidCredentials)));
    }
}
