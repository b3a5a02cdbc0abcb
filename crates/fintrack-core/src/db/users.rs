//! User operations

use rusqlite::{params, ErrorCode, OptionalExtension, Row};
use tracing::{info, warn};

use super::{parse_datetime, Database};
use crate::auth::{self, Registration};
use crate::error::{Error, Result};
use crate::models::{NewUser, User, UserCredentials};

const USER_COLUMNS: &str = "id, username, email, created_at";

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
    let created_at: String = row.get(3)?;
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        created_at: parse_datetime(&created_at),
    })
}

impl Database {
    /// Insert a user whose password is already hashed
    ///
    /// Fails with `Error::Conflict` when the username is taken. The UNIQUE
    /// constraint decides, so concurrent registrations cannot both succeed.
    pub fn create_user(&self, user: &NewUser) -> Result<User> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO users (username, email, password_hash) VALUES (?, ?, ?)",
            params![user.username, user.email, user.password_hash],
        )
        .map_err(|e| match e {
            rusqlite::Error::SqliteFailure(err, _)
                if err.code == ErrorCode::ConstraintViolation
                    && err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                Error::Conflict("Username already exists".to_string())
            }
            other => Error::Database(other),
        })?;
        let id = conn.last_insert_rowid();
        drop(conn);

        self.get_user(id)?
            .ok_or_else(|| Error::NotFound(format!("user {}", id)))
    }

    /// Validate, hash, and insert a new user
    pub fn register_user(&self, registration: &Registration) -> Result<User> {
        registration.validate()?;
        let password_hash = auth::hash_password(&registration.password)?;
        let user = self.create_user(&NewUser {
            username: registration.username.trim().to_string(),
            email: registration.email.trim().to_string(),
            password_hash,
        })?;
        info!(user_id = user.id, username = %user.username, "Registered user");
        Ok(user)
    }

    /// Check a username/password pair
    ///
    /// Unknown users and wrong passwords are indistinguishable to the caller.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<User> {
        let creds = match self.get_credentials(username.trim())? {
            Some(creds) => creds,
            None => {
                warn!(username = %username, "Login for unknown user");
                return Err(Error::Authentication(
                    "Invalid username or password".to_string(),
                ));
            }
        };

        if !auth::verify_password(password, &creds.password_hash)? {
            warn!(user_id = creds.user.id, "Login with wrong password");
            return Err(Error::Authentication(
                "Invalid username or password".to_string(),
            ));
        }

        Ok(creds.user)
    }

    pub fn get_user(&self, id: i64) -> Result<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                &format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS),
                params![id],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                &format!("SELECT {} FROM users WHERE username = ?", USER_COLUMNS),
                params![username],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    fn get_credentials(&self, username: &str) -> Result<Option<UserCredentials>> {
        let conn = self.conn()?;
        let creds = conn
            .query_row(
                &format!(
                    "SELECT {}, password_hash FROM users WHERE username = ?",
                    USER_COLUMNS
                ),
                params![username],
                |row| {
                    Ok(UserCredentials {
                        user: row_to_user(row)?,
                        password_hash: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(creds)
    }

    pub fn list_users(&self) -> Result<Vec<User>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM users ORDER BY username",
            USER_COLUMNS
        ))?;
        let users = stmt
            .query_map([], row_to_user)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(users)
    }

    /// Delete a user and, by cascade, their expenses
    pub fn delete_user(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM users WHERE id = ?", params![id])?;
        if deleted == 0 {
            return Err(Error::NotFound(format!("user {}", id)));
        }
        Ok(())
    }
}
