//! Identity port: resolves who is behind a connection's credentials.

use async_trait::async_trait;

use super::{
    IdentityError,
    value_object::{AccountId, Caller, CallerToken, Role},
};

/// Caller identity oracle.
///
/// Token issuance and validation live outside this crate; implementations only answer
/// "who is this" for a token captured when the connection was accepted.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn caller_account_id(&self, token: &CallerToken) -> Result<AccountId, IdentityError>;

    async fn caller_role(&self, token: &CallerToken) -> Result<Role, IdentityError>;
}

/// Resolve both halves of a caller's identity.
pub async fn resolve_caller(
    identity: &dyn IdentityProvider,
    token: &CallerToken,
) -> Result<Caller, IdentityError> {
    let account_id = identity.caller_account_id(token).await?;
    let role = identity.caller_role(token).await?;
    Ok(Caller { account_id, role })
}
