use agij_types::Address;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentityError {
    #[error("zero address supplied for {0}")]
    ZeroAddress(&'static str),

    #[error("zero root supplied for {0}")]
    ZeroRoot(&'static str),

    #[error("agent {0} is not authorized")]
    NotAuthorizedAgent(Address),

    #[error("validator {0} is not authorized")]
    UnauthorizedValidator(Address),
}
