//! KMS backend for secret decryption.

use async_trait::async_trait;
use aws_sdk_kms::Client;
use aws_sdk_kms::error::DisplayErrorContext;
use aws_sdk_kms::primitives::Blob;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use shepherd_core::secret::SecretDecryptor;
use shepherd_core::{Error, Result, Service};

/// Decrypts base64-encoded KMS ciphertexts.
pub struct KmsDecryptor {
    client: Client,
}

impl KmsDecryptor {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn decode_ciphertext(ciphertext: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(ciphertext.trim())
        .map_err(|e| Error::Decryption(format!("ciphertext is not valid base64: {}", e)))
}

fn plaintext_to_string(plaintext: &[u8]) -> Result<String> {
    String::from_utf8(plaintext.to_vec())
        .map_err(|_| Error::Decryption("plaintext is not valid UTF-8".to_string()))
}

#[async_trait]
impl SecretDecryptor for KmsDecryptor {
    async fn decrypt(&self, ciphertext: &str) -> Result<String> {
        let blob = Blob::new(decode_ciphertext(ciphertext)?);

        let output = self
            .client
            .decrypt()
            .ciphertext_blob(blob)
            .send()
            .await
            .map_err(|e| Error::upstream(Service::Kms, "Decrypt", DisplayErrorContext(e)))?;

        let plaintext = output
            .plaintext()
            .ok_or_else(|| Error::Decryption("response carried no plaintext".to_string()))?;
        plaintext_to_string(plaintext.as_ref())
    }
}
