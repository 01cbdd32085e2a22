//! RSA key material for signing and verifying tokens.
//!
//! A [`KeyStore`] is built once at startup and then shared read-only
//! (typically behind an `Arc`) by every component that signs or verifies.
//! There is no global key state: each codec is handed the store it uses.

use crate::claims::{Claims, Subject, TokenClass};
use crate::error::{AuthError, Result};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::fmt;
use std::path::Path;
use tracing::info;

/// Algorithm used for every token this process signs
pub const SIGNING_ALGORITHM: Algorithm = Algorithm::RS256;

/// Header algorithms a verifier will consider. Anything else, RSASSA-PSS
/// included, is rejected before the signature is checked.
pub const ACCEPTED_ALGORITHMS: [Algorithm; 3] =
    [Algorithm::RS256, Algorithm::RS384, Algorithm::RS512];

/// Signing/verifying key pair.
///
/// The usual roles are verify-only (public key alone) and issue+verify
/// (both keys). The private key never leaves this type.
pub struct KeyStore {
    signing: Option<EncodingKey>,
    verifying: Option<DecodingKey>,
}

impl KeyStore {
    /// Build a store from PEM-encoded RSA keys.
    ///
    /// ## Errors
    ///
    /// `KeyLoad` if a PEM fails to parse, if neither key is given, or if
    /// both keys are given but do not belong to the same pair.
    pub fn from_pem(private_key_pem: Option<&str>, public_key_pem: Option<&str>) -> Result<Self> {
        if private_key_pem.is_none() && public_key_pem.is_none() {
            return Err(AuthError::KeyLoad("No key material supplied".to_string()));
        }

        let signing = private_key_pem
            .map(|pem| {
                EncodingKey::from_rsa_pem(pem.as_bytes()).map_err(|e| {
                    AuthError::KeyLoad(format!("Failed to parse RSA private key: {e}"))
                })
            })
            .transpose()?;

        let verifying = public_key_pem
            .map(|pem| {
                DecodingKey::from_rsa_pem(pem.as_bytes()).map_err(|e| {
                    AuthError::KeyLoad(format!("Failed to parse RSA public key: {e}"))
                })
            })
            .transpose()?;

        let store = Self { signing, verifying };

        if store.can_sign() && store.can_verify() {
            store.check_pair()?;
        }

        info!(
            can_sign = store.can_sign(),
            can_verify = store.can_verify(),
            "RSA key material loaded"
        );
        Ok(store)
    }

    /// Verify-only store for services that never issue tokens.
    pub fn verify_only(public_key_pem: &str) -> Result<Self> {
        Self::from_pem(None, Some(public_key_pem))
    }

    /// Read PEM files from disk and build a store.
    pub fn from_files(
        private_key_path: Option<&Path>,
        public_key_path: Option<&Path>,
    ) -> Result<Self> {
        let private_pem = private_key_path.map(read_pem).transpose()?;
        let public_pem = public_key_path.map(read_pem).transpose()?;
        Self::from_pem(private_pem.as_deref(), public_pem.as_deref())
    }

    pub fn can_sign(&self) -> bool {
        self.signing.is_some()
    }

    pub fn can_verify(&self) -> bool {
        self.verifying.is_some()
    }

    pub fn signing_key(&self) -> Result<&EncodingKey> {
        self.signing.as_ref().ok_or(AuthError::SigningKeyMissing)
    }

    pub fn verifying_key(&self) -> Result<&DecodingKey> {
        self.verifying.as_ref().ok_or(AuthError::VerifyKeyMissing)
    }

    /// Sign and verify a probe so a mismatched pair fails at startup rather
    /// than on the first request.
    fn check_pair(&self) -> Result<()> {
        let probe = Claims::new(&Subject::new(0), TokenClass::Access, 0);
        let token = encode(&Header::new(SIGNING_ALGORITHM), &probe, self.signing_key()?)
            .map_err(|e| AuthError::KeyLoad(format!("Probe signing failed: {e}")))?;

        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.validate_exp = false;

        decode::<Claims>(&token, self.verifying_key()?, &validation)
            .map(|_| ())
            .map_err(|_| {
                AuthError::KeyLoad("RSA private and public keys do not form a pair".to_string())
            })
    }
}

impl fmt::Debug for KeyStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyStore")
            .field("can_sign", &self.can_sign())
            .field("can_verify", &self.can_verify())
            .finish()
    }
}

pub(crate) fn read_pem(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| AuthError::KeyLoad(format!("Failed to read {}: {e}", path.display())))
}
