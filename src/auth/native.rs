//! Native auth — local secp256k1 key signing.
//!
//! Only available with the `native-auth` feature.

use async_trait::async_trait;
use secp256k1::{schnorr, Keypair, Message, Secp256k1, SecretKey, XOnlyPublicKey};

use crate::auth::Signer;
use crate::error::AuthError;
use crate::event::{Event, UnsignedEvent};

/// BIP-340 signer over a secret key held in process memory.
///
/// Each signature uses fresh auxiliary randomness, so signing the same event
/// twice yields different signatures.
pub struct KeySigner {
    secp: Secp256k1<secp256k1::All>,
    keypair: Keypair,
    public_key: String,
}

impl KeySigner {
    /// Random key, for tests and throwaway identities.
    pub fn generate() -> Self {
        loop {
            // Out-of-range scalars are astronomically rare; draw again.
            if let Ok(secret) = SecretKey::from_slice(&rand::random::<[u8; 32]>()) {
                return Self::from_secret_key(secret);
            }
        }
    }

    pub fn from_secret_hex(secret_hex: &str) -> Result<Self, AuthError> {
        let bytes =
            hex::decode(secret_hex.trim()).map_err(|e| AuthError::InvalidKey(e.to_string()))?;
        let secret =
            SecretKey::from_slice(&bytes).map_err(|e| AuthError::InvalidKey(e.to_string()))?;
        Ok(Self::from_secret_key(secret))
    }

    fn from_secret_key(secret: SecretKey) -> Self {
        let secp = Secp256k1::new();
        let keypair = Keypair::from_secret_key(&secp, &secret);
        let (xonly, _parity) = keypair.x_only_public_key();
        Self {
            secp,
            keypair,
            public_key: hex::encode(xonly.serialize()),
        }
    }

    pub fn public_key_hex(&self) -> &str {
        &self.public_key
    }

    /// Sign synchronously. The event's pubkey must be this signer's key.
    pub fn sign(&self, event: UnsignedEvent) -> Result<Event, AuthError> {
        if event.pubkey != self.public_key {
            return Err(AuthError::Mismatch {
                field: "pubkey",
                expected: self.public_key.clone(),
                actual: event.pubkey,
            });
        }

        let id = event
            .compute_id()
            .map_err(|e| AuthError::SigningFailed(e.to_string()))?;
        let message = id_message(&id).map_err(AuthError::SigningFailed)?;
        let aux: [u8; 32] = rand::random();
        let sig = self
            .secp
            .sign_schnorr_with_aux_rand(&message, &self.keypair, &aux);

        Ok(event.into_signed(id, sig.to_string()))
    }
}

impl std::fmt::Debug for KeySigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeySigner")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Signer for KeySigner {
    async fn public_key(&self) -> Result<String, AuthError> {
        Ok(self.public_key.clone())
    }

    async fn sign_event(&self, event: UnsignedEvent) -> Result<Event, AuthError> {
        self.sign(event)
    }
}

/// Check the event id and its BIP-340 signature.
pub fn verify_event(event: &Event) -> Result<(), AuthError> {
    if !event.has_valid_id() {
        return Err(AuthError::InvalidSignature);
    }

    let message = id_message(&event.id).map_err(|_| AuthError::InvalidSignature)?;
    let pubkey_bytes = hex::decode(&event.pubkey).map_err(|_| AuthError::InvalidSignature)?;
    let pubkey =
        XOnlyPublicKey::from_slice(&pubkey_bytes).map_err(|_| AuthError::InvalidSignature)?;
    let sig_bytes = hex::decode(&event.sig).map_err(|_| AuthError::InvalidSignature)?;
    let sig = schnorr::Signature::from_slice(&sig_bytes).map_err(|_| AuthError::InvalidSignature)?;

    Secp256k1::verification_only()
        .verify_schnorr(&sig, &message, &pubkey)
        .map_err(|_| AuthError::InvalidSignature)
}

fn id_message(id: &str) -> Result<Message, String> {
    let digest = hex::decode(id).map_err(|e| e.to_string())?;
    Message::from_digest_slice(&digest).map_err(|e| e.to_string())
}
