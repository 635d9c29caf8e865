//! Conversions from external infrastructure errors into domain errors.

use cadence_domain::CadenceError;
use r2d2::Error as PoolError;
use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;

/// Error newtype that keeps conversions on the infrastructure side and can
/// be converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub CadenceError);

impl From<InfraError> for CadenceError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<CadenceError> for InfraError {
    fn from(value: CadenceError) -> Self {
        InfraError(value)
    }
}

impl std::fmt::Display for InfraError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for InfraError {}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → CadenceError */
/* -------------------------------------------------------------------------- */

impl From<SqlError> for InfraError {
    fn from(err: SqlError) -> Self {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        let domain = match err {
            RE::SqliteFailure(inner, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match inner.code {
                    ErrorCode::DatabaseBusy => CadenceError::Database("database is busy".into()),
                    ErrorCode::DatabaseLocked => {
                        CadenceError::Database("database is locked".into())
                    }
                    ErrorCode::ConstraintViolation => {
                        CadenceError::Database(format!("constraint violation: {message}"))
                    }
                    _ => CadenceError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        inner.code, inner.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => {
                CadenceError::NotFound("no rows returned by query".into())
            }
            RE::FromSqlConversionFailure(_, _, cause) => {
                CadenceError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                CadenceError::Database(format!("invalid column type: {ty}"))
            }
            other => CadenceError::Database(other.to_string()),
        };

        InfraError(domain)
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → CadenceError */
/* -------------------------------------------------------------------------- */

impl From<PoolError> for InfraError {
    fn from(err: PoolError) -> Self {
        InfraError(CadenceError::Database(format!("connection pool error: {err}")))
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → CadenceError */
/* -------------------------------------------------------------------------- */

impl From<HttpError> for InfraError {
    fn from(err: HttpError) -> Self {
        let domain = if err.is_timeout() {
            CadenceError::Network(format!("http request timed out: {err}"))
        } else if err.is_connect() {
            CadenceError::Network(format!("http connection failed: {err}"))
        } else if err.is_decode() {
            CadenceError::InvalidInput(format!("failed to decode http response: {err}"))
        } else {
            CadenceError::Network(format!("http error: {err}"))
        };

        InfraError(domain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_rows_maps_to_not_found() {
        let err: InfraError = SqlError::QueryReturnedNoRows.into();
        assert!(matches!(err.0, CadenceError::NotFound(_)));
    }

    #[test]
    fn round_trips_through_domain_error() {
        let original = CadenceError::Database("boom".into());
        let infra: InfraError = original.into();
        let back: CadenceError = infra.into();
        assert!(matches!(back, CadenceError::Database(_)));
    }
}
