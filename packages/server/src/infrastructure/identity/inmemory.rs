//! Token table identity provider.
//!
//! Stands in for the external token service: each known token maps to an account id and
//! a role. Seeds come from a JSON accounts file:
//!
//! ```json
//! [{"token": "alice-token", "account_id": 1, "role": "user"}]
//! ```

use std::{collections::HashMap, path::Path};

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::{AccountId, Caller, CallerToken, IdentityError, IdentityProvider, Role};

/// One entry of the accounts file.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountSeed {
    pub token: String,
    pub account_id: i64,
    pub role: Role,
}

#[derive(Debug, thiserror::Error)]
pub enum AccountsFileError {
    #[error("failed to read accounts file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse accounts file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Identity provider backed by a fixed token table.
#[derive(Debug, Default)]
pub struct InMemoryIdentityProvider {
    callers: HashMap<String, Caller>,
}

impl InMemoryIdentityProvider {
    pub fn new(seeds: impl IntoIterator<Item = AccountSeed>) -> Self {
        let callers = seeds
            .into_iter()
            .map(|seed| {
                (
                    seed.token,
                    Caller {
                        account_id: AccountId::new(seed.account_id),
                        role: seed.role,
                    },
                )
            })
            .collect();
        Self { callers }
    }

    /// Load seeds from a JSON accounts file.
    pub fn from_file(path: &Path) -> Result<Self, AccountsFileError> {
        let text = std::fs::read_to_string(path)?;
        let seeds: Vec<AccountSeed> = serde_json::from_str(&text)?;
        Ok(Self::new(seeds))
    }

    pub fn len(&self) -> usize {
        self.callers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callers.is_empty()
    }

    fn lookup(&self, token: &CallerToken) -> Result<&Caller, IdentityError> {
        self.callers
            .get(token.as_str())
            .ok_or(IdentityError::Unauthenticated)
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn caller_account_id(&self, token: &CallerToken) -> Result<AccountId, IdentityError> {
        self.lookup(token).map(|caller| caller.account_id)
    }

    async fn caller_role(&self, token: &CallerToken) -> Result<Role, IdentityError> {
        self.lookup(token).map(|caller| caller.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_provider() -> InMemoryIdentityProvider {
        InMemoryIdentityProvider::new(vec![
            AccountSeed {
                token: "alice-token".to_string(),
                account_id: 1,
                role: Role::User,
            },
            AccountSeed {
                token: "root-token".to_string(),
                account_id: 99,
                role: Role::Admin,
            },
        ])
    }

    #[tokio::test]
    async fn test_known_token_resolves_caller() {
        // テスト項目: 登録済みトークンからアカウント ID とロールが取得できる
        // given (前提条件):
        let provider = create_test_provider();
        let token = CallerToken::new("root-token").unwrap();

        // when (操作):
        let account_id = provider.caller_account_id(&token).await;
        let role = provider.caller_role(&token).await;

        // then (期待する結果):
        assert_eq!(account_id, Ok(AccountId::new(99)));
        assert_eq!(role, Ok(Role::Admin));
    }

    #[tokio::test]
    async fn test_unknown_token_is_unauthenticated() {
        // テスト項目: 未登録トークンは Unauthenticated になる
        // given (前提条件):
        let provider = create_test_provider();
        let token = CallerToken::new("forged").unwrap();

        // when (操作):
        let result = provider.caller_account_id(&token).await;

        // then (期待する結果):
        assert_eq!(result, Err(IdentityError::Unauthenticated));
    }

    #[test]
    fn test_seeds_parse_from_json() {
        // テスト項目: アカウントファイルの JSON 形式をパースできる
        // given (前提条件):
        let json = r#"[{"token":"t","account_id":5,"role":"editor"}]"#;

        // when (操作):
        let seeds: Vec<AccountSeed> = serde_json::from_str(json).unwrap();
        let provider = InMemoryIdentityProvider::new(seeds);

        // then (期待する結果):
        assert_eq!(provider.len(), 1);
        assert_eq!(
            provider.callers.get("t"),
            Some(&Caller {
                account_id: AccountId::new(5),
                role: Role::Editor
            })
        );
    }
}
