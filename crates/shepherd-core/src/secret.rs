//! Secret decryption.
//!
//! Secrets arrive encrypted in the runtime configuration and are decrypted
//! once at the start of every activation. The resulting [`Secrets`] bundle
//! is passed explicitly to whatever needs it.

use async_trait::async_trait;

use crate::Result;

/// Trait for secret decryption backends.
#[async_trait]
pub trait SecretDecryptor: Send + Sync {
    /// Decrypt a base64-encoded ciphertext into its plaintext.
    async fn decrypt(&self, ciphertext: &str) -> Result<String>;
}

/// Decrypted secrets for one activation.
#[derive(Clone)]
pub struct Secrets {
    github_token: String,
}

impl Secrets {
    pub fn new(github_token: impl Into<String>) -> Self {
        Self {
            github_token: github_token.into(),
        }
    }

    /// Decrypt the encrypted GitHub access token.
    pub async fn decrypt(
        decryptor: &dyn SecretDecryptor,
        encrypted_github_token: &str,
    ) -> Result<Self> {
        let github_token = decryptor.decrypt(encrypted_github_token).await?;
        Ok(Self { github_token })
    }

    pub fn github_token(&self) -> &str {
        &self.github_token
    }
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("github_token", &"[redacted]")
            .finish()
    }
}
