//! Single-coin transactions and their content-derived identifiers.

use crate::crypto::{Keypair, PublicKey, Signature};
use crate::hash::{hash_concat, TxId};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Serialize, Serializer};
use std::fmt;
use std::hash::{Hash as StdHash, Hasher};
use thiserror::Error;

/// Length of the random marker carried by coin-creation transactions.
pub const MINT_MARKER_LEN: usize = 48;

/// Errors that can occur during transaction operations.
#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("signature verification failed")]
    VerificationFailed,
    #[error("coin-creation transaction has no input to authorize")]
    MissingInput,
}

/// Random bytes that stand in for a signature on coin-creation transactions,
/// making every two minted coins distinct.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct MintMarker(pub [u8; MINT_MARKER_LEN]);

impl MintMarker {
    /// Draw a fresh marker from the OS random source.
    pub fn random() -> Self {
        let mut bytes = [0u8; MINT_MARKER_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; MINT_MARKER_LEN] {
        &self.0
    }
}

impl fmt::Debug for MintMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MintMarker({}...)", hex::encode(&self.0[..8]))
    }
}

impl Serialize for MintMarker {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(&self.0)
    }
}

/// What a transaction consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TxKind {
    /// A coin out of thin air. Only the bank's mint path produces these.
    Creation { marker: MintMarker },
    /// Moves the coin created by `input` to a new owner, authorized by the
    /// current owner's signature over `input ++ output`.
    Transfer { input: TxId, signature: Signature },
}

/// A transaction moving exactly one coin.
///
/// Immutable once built. Two transactions are equal iff their ids are equal.
#[derive(Debug, Clone, Serialize)]
pub struct Transaction {
    output: PublicKey,
    kind: TxKind,
    id: TxId,
}

impl Transaction {
    /// Build a transfer from its raw parts. No validity check is performed.
    pub fn transfer(output: PublicKey, input: TxId, signature: Signature) -> Self {
        let id = hash_concat(&[input.as_bytes(), &output.as_bytes(), signature.as_bytes()]);
        Self {
            output,
            kind: TxKind::Transfer { input, signature },
            id,
        }
    }

    /// Build a coin-creation transaction.
    pub fn creation(output: PublicKey, marker: MintMarker) -> Self {
        let id = hash_concat(&[&output.as_bytes(), marker.as_bytes()]);
        Self {
            output,
            kind: TxKind::Creation { marker },
            id,
        }
    }

    /// Spend the coin `input` to `output`, signing with the owner's keypair.
    pub fn signed_transfer(keypair: &Keypair, input: TxId, output: PublicKey) -> Self {
        let signature = keypair.sign(&Self::signing_payload(&input, &output));
        Self::transfer(output, input, signature)
    }

    /// The bytes an owner signs to authorize spending `input` to `output`.
    pub fn signing_payload(input: &TxId, output: &PublicKey) -> Vec<u8> {
        let mut payload = Vec::with_capacity(64);
        payload.extend_from_slice(input.as_bytes());
        payload.extend_from_slice(&output.as_bytes());
        payload
    }

    pub fn id(&self) -> TxId {
        self.id
    }

    /// Recipient of the coin.
    pub fn output(&self) -> &PublicKey {
        &self.output
    }

    /// The consumed transaction, absent for coin creation.
    pub fn input(&self) -> Option<&TxId> {
        match &self.kind {
            TxKind::Transfer { input, .. } => Some(input),
            TxKind::Creation { .. } => None,
        }
    }

    pub fn signature(&self) -> Option<&Signature> {
        match &self.kind {
            TxKind::Transfer { signature, .. } => Some(signature),
            TxKind::Creation { .. } => None,
        }
    }

    pub fn kind(&self) -> &TxKind {
        &self.kind
    }

    pub fn is_creation(&self) -> bool {
        matches!(self.kind, TxKind::Creation { .. })
    }

    /// Check that `owner` authorized this transfer.
    pub fn verify_spend(&self, owner: &PublicKey) -> Result<(), TransactionError> {
        match &self.kind {
            TxKind::Transfer { input, signature } => owner
                .verify(&Self::signing_payload(input, &self.output), signature)
                .map_err(|_| TransactionError::VerificationFailed),
            TxKind::Creation { .. } => Err(TransactionError::MissingInput),
        }
    }
}

impl PartialEq for Transaction {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Transaction {}

impl StdHash for Transaction {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tx-{}", self.id.short())
    }
}
