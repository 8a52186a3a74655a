use thiserror::Error;

use crate::store::error::StoreError;

/// Why a request could not be given (or proceed with) an identity.
///
/// Every variant except `Store` is answered with 401. The messages never say
/// whether a token was unknown or merely expired.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid or missing authentication token")]
    InvalidAuthHeader,
    #[error("invalid or missing authentication token")]
    InvalidToken,
    #[error("invalid or missing authentication token")]
    InvalidOrExpiredToken,
    #[error("you must be authenticated to access this resource")]
    AuthenticationRequired,
    #[error(transparent)]
    Store(#[from] StoreError),
}
