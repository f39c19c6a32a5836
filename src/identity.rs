//! Ledger identity: the account address plus its passphrase-locked signing key

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use ed25519_dalek::{Signer, SigningKey};
use hmac::Hmac;
use pbkdf2::pbkdf2;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use thiserror::Error;

use crate::error::{AccountError, Result};
use crate::types::Address;

pub const DEFAULT_KEY_ROUNDS: u32 = 100_000;

const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum IdentityError {
    #[error("Key encryption failed")]
    EncryptionFailed,
    #[error("Invalid key material")]
    InvalidKey,
}

/// A single ledger account identity.
///
/// The secret seed is never kept in the clear: it is sealed with an
/// AES-256-GCM key derived from the passphrase and only opened for the
/// duration of a signing call.
#[derive(Debug, Clone)]
pub struct LedgerIdentity {
    address: Address,
    encrypted_seed: Vec<u8>, // nonce || ciphertext
    salt: Vec<u8>,
    rounds: u32,
}

impl LedgerIdentity {
    /// Create an identity with a fresh random keypair
    pub fn generate(passphrase: &str, rounds: u32) -> std::result::Result<Self, IdentityError> {
        let signing_key = SigningKey::generate(&mut OsRng);
        Self::from_seed(&signing_key.to_bytes(), passphrase, rounds)
    }

    /// Create an identity from an existing 32-byte ed25519 seed
    pub fn from_seed(
        seed: &[u8],
        passphrase: &str,
        rounds: u32,
    ) -> std::result::Result<Self, IdentityError> {
        let seed: [u8; 32] = seed.try_into().map_err(|_| IdentityError::InvalidKey)?;
        let signing_key = SigningKey::from_bytes(&seed);
        let address = Address::new(hex::encode(signing_key.verifying_key().to_bytes()));

        let rounds = rounds.max(1);
        let mut salt = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);

        let cipher = Aes256Gcm::new_from_slice(&derive_key(passphrase, &salt, rounds))
            .map_err(|_| IdentityError::InvalidKey)?;
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), &seed[..])
            .map_err(|_| IdentityError::EncryptionFailed)?;

        let mut encrypted_seed = nonce_bytes.to_vec();
        encrypted_seed.extend_from_slice(&ciphertext);

        Ok(LedgerIdentity {
            address,
            encrypted_seed,
            salt: salt.to_vec(),
            rounds,
        })
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Open the signing key with `passphrase`
    pub fn unlock(&self, passphrase: &str) -> Result<SigningKey> {
        if self.encrypted_seed.len() < NONCE_LEN {
            return Err(AccountError::Passphrase);
        }
        let (nonce_bytes, ciphertext) = self.encrypted_seed.split_at(NONCE_LEN);

        let cipher = Aes256Gcm::new_from_slice(&derive_key(passphrase, &self.salt, self.rounds))
            .map_err(|_| AccountError::Passphrase)?;
        let plaintext = cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| AccountError::Passphrase)?;

        let seed: [u8; 32] = plaintext
            .as_slice()
            .try_into()
            .map_err(|_| AccountError::Passphrase)?;
        let signing_key = SigningKey::from_bytes(&seed);

        // Sealed seed must still belong to this address
        if hex::encode(signing_key.verifying_key().to_bytes()) != self.address.as_str() {
            return Err(AccountError::Passphrase);
        }
        Ok(signing_key)
    }

    /// Sign `message` and return the hex signature
    pub fn sign_hex(&self, passphrase: &str, message: &[u8]) -> Result<String> {
        let key = self.unlock(passphrase)?;
        Ok(hex::encode(key.sign(message).to_bytes()))
    }
}

fn derive_key(passphrase: &str, salt: &[u8], rounds: u32) -> [u8; 32] {
    let mut key = [0u8; 32];
    pbkdf2::<Hmac<Sha256>>(passphrase.as_bytes(), salt, rounds, &mut key);
    key
}
