use crate::error::CredentialError;
use async_trait::async_trait;
use std::collections::HashSet;

/// Accept/reject oracle consulted before a viewer is admitted.
#[async_trait]
pub trait CredentialVerifier: Send + Sync + 'static {
    async fn verify(
        &self,
        token: Option<&str>,
        account_id: Option<&str>,
    ) -> Result<(), CredentialError>;
}

pub struct AcceptAll;

#[async_trait]
impl CredentialVerifier for AcceptAll {
    async fn verify(&self, _token: Option<&str>, _account_id: Option<&str>) -> Result<(), CredentialError> {
        Ok(())
    }
}

/// Accepts a fixed set of tokens.
pub struct TokenList {
    tokens: HashSet<String>,
}

impl TokenList {
    pub fn new(tokens: impl IntoIterator<Item = String>) -> Self {
        Self {
            tokens: tokens.into_iter().collect(),
        }
    }
}

#[async_trait]
impl CredentialVerifier for TokenList {
    async fn verify(&self, token: Option<&str>, _account_id: Option<&str>) -> Result<(), CredentialError> {
        let token = token.ok_or(CredentialError::Missing)?;
        if self.tokens.contains(token) {
            Ok(())
        } else {
            Err(CredentialError::Rejected)
        }
    }
}
