use common::ClaimStatus;
use sea_orm::{DbErr, RuntimeErr};
use thiserror::Error;

/// Failure kinds of claim workflow operations.
///
/// Every variant is reported to the caller; none of them leaves a partial
/// write behind.
#[derive(Debug, Error)]
pub enum ClaimError {
    /// Malformed input such as a short message or an unusable contact value.
    #[error("{0}")]
    Validation(String),

    #[error("You cannot claim an item you reported")]
    SelfClaimNotAllowed,

    #[error("You already have an open claim on this item")]
    DuplicateClaim,

    /// The actor is neither a party to the claim nor allowed to moderate it.
    /// Also returned for missing claims so non-parties cannot probe ids.
    #[error("Not authorized")]
    NotAuthorized,

    #[error("This claim was already handled (current status: {current})")]
    InvalidTransition { current: ClaimStatus },

    #[error("Contact details can only be shared once the claim is approved")]
    PrematureDisclosure,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Store error: {0}")]
    Store(DbErr),
}

impl From<DbErr> for ClaimError {
    fn from(err: DbErr) -> Self {
        match err {
            DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => {
                ClaimError::StoreUnavailable(err.to_string())
            }
            DbErr::Exec(ref e) | DbErr::Query(ref e) if is_lock_contention(e) => {
                ClaimError::StoreUnavailable(err.to_string())
            }
            other => ClaimError::Store(other),
        }
    }
}

/// SQLite busy/locked and Postgres serialization or deadlock failures. The
/// statement did not run; retrying the whole operation is safe.
fn is_lock_contention(err: &RuntimeErr) -> bool {
    let RuntimeErr::SqlxError(e) = err else {
        return false;
    };
    e.as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| matches!(&*code, "5" | "6" | "517" | "40001" | "40P01"))
}
