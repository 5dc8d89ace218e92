//! Classification of database constraint violations
//!
//! ```rust,ignore
//! sqlx::query("INSERT INTO team_invitations ...")
//!     .execute(&pool)
//!     .await
//!     .map_err(|e| map_unique_violation(e, InviteMemberError::AlreadyInvited(email), InviteMemberError::Database))?;
//! ```

use sqlx::Error as SqlxError;

pub fn is_unique_violation(error: &SqlxError) -> bool {
    matches!(error, SqlxError::Database(db_err) if db_err.is_unique_violation())
}

pub fn is_foreign_key_violation(error: &SqlxError) -> bool {
    matches!(error, SqlxError::Database(db_err) if db_err.is_foreign_key_violation())
}

/// `unique_error` on a unique violation, otherwise `default_wrapper(error)`
pub fn map_unique_violation<E, F>(error: SqlxError, unique_error: E, default_wrapper: F) -> E
where
    F: FnOnce(SqlxError) -> E,
{
    if is_unique_violation(&error) {
        unique_error
    } else {
        default_wrapper(error)
    }
}

/// `fk_error` on a foreign key violation, otherwise `default_wrapper(error)`
pub fn map_foreign_key_violation<E, F>(error: SqlxError, fk_error: E, default_wrapper: F) -> E
where
    F: FnOnce(SqlxError) -> E,
{
    if is_foreign_key_violation(&error) {
        fk_error
    } else {
        default_wrapper(error)
    }
}
