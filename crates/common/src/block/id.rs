use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Size of a BLAKE3 digest in bytes (256 bits)
pub const BLOCK_ID_SIZE: usize = 32;
/// Size of a reference nonce in bytes
pub const REF_NONCE_SIZE: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum BlockIdError {
    #[error("invalid block id hex: {0}")]
    Hex(#[from] hex::FromHexError),
}

/// Content hash of a block
///
/// Ids are BLAKE3 digests of the (encrypted) block bytes. The all-zero
///  id is reserved as the "no block" sentinel and is never valid.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId([u8; BLOCK_ID_SIZE]);

impl BlockId {
    /// Derive the id of a block from its content
    pub fn hash(data: &[u8]) -> Self {
        BlockId(*blake3::hash(data).as_bytes())
    }

    /// Whether this id could name a real block
    pub fn is_valid(&self) -> bool {
        self.0 != [0u8; BLOCK_ID_SIZE]
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(hex: &str) -> Result<Self, BlockIdError> {
        let mut buff = [0u8; BLOCK_ID_SIZE];
        hex::decode_to_slice(hex, &mut buff)?;
        Ok(BlockId(buff))
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // short form is enough to tell blocks apart in logs
        write!(f, "BlockId({})", &self.to_hex()[..16])
    }
}

impl FromStr for BlockId {
    type Err = BlockIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

/// Distinguishes multiple references to the same block
///
/// The first reference to a block always carries the zero nonce;
///  every additional reference (e.g. a copied file sharing the
///  same content) gets a fresh random one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RefNonce([u8; REF_NONCE_SIZE]);

impl RefNonce {
    /// Nonce of the first reference to a block
    pub const ZERO: RefNonce = RefNonce([0u8; REF_NONCE_SIZE]);

    /// Generate a random, non-zero nonce
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        loop {
            let bytes: [u8; REF_NONCE_SIZE] = rng.random();
            if bytes != [0u8; REF_NONCE_SIZE] {
                return RefNonce(bytes);
            }
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl fmt::Display for RefNonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}
