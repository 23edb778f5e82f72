/// SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// SQLSTATE for `foreign_key_violation`.
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Failure reported by a [`RecordStore`](crate::RecordStore).
///
/// Constraint violations are split out so callers can react to them
/// (retry a slug, re-fetch a tag) instead of parsing driver errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the write. Carries the constraint name.
    #[error("Duplicate value violates unique constraint: {0}")]
    UniqueViolation(String),

    /// A foreign key rejected the write. Carries the constraint name.
    #[error("Referenced row does not exist: {0}")]
    ForeignKeyViolation(String),

    /// A row did not match the expected shape.
    #[error("Row decode failed: {0}")]
    Decode(String),

    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let constraint = db_err.constraint().unwrap_or("unknown").to_string();
            let code = db_err.code().map(|c| c.into_owned());
            match code.as_deref() {
                Some(UNIQUE_VIOLATION) => {
                    tracing::debug!(%constraint, "Unique constraint rejected write");
                    return Self::UniqueViolation(constraint);
                }
                Some(FOREIGN_KEY_VIOLATION) => {
                    tracing::debug!(%constraint, "Foreign key rejected write");
                    return Self::ForeignKeyViolation(constraint);
                }
                _ => {}
            }
        }
        if let sqlx::Error::ColumnDecode { index, source } = &err {
            tracing::warn!(%index, error = %source, "Column decode failed");
            return Self::Decode(format!("column {index}: {source}"));
        }
        Self::Database(err)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn driver_failures_stay_database_errors() {
        assert_matches!(
            StoreError::from(sqlx::Error::PoolTimedOut),
            StoreError::Database(sqlx::Error::PoolTimedOut)
        );
    }

    #[test]
    fn column_decode_failures_become_decode_errors() {
        let err = sqlx::Error::ColumnDecode {
            index: "kind".into(),
            source: "unknown result kind 'video'".into(),
        };
        assert_matches!(
            StoreError::from(err),
            StoreError::Decode(message) if message.contains("kind") && message.contains("video")
        );
    }
}
