use std::fmt;

use serde::{Deserialize, Serialize};

use super::id::{BlockId, RefNonce};

/// Key generation used to encrypt a block
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct KeyGen(pub u32);

impl KeyGen {
    pub const FIRST: KeyGen = KeyGen(1);
}

/// Version of the block data format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DataVer(pub u32);

impl DataVer {
    pub const FIRST: DataVer = DataVer(1);
}

/**
 * Block Pointers
 * ==============
 * A block pointer says where the current content of a
 *  filesystem object lives. Every write re-encrypts and
 *  re-hashes the content, so the same logical object ends
 *  up behind a new pointer after each update.
 * The stable part of a pointer -- its id and ref nonce at
 *  the moment the object was first seen -- is the object's
 *  identity, see [`BlockRef`].
 */
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockPointer {
    pub id: BlockId,
    pub key_gen: KeyGen,
    pub data_ver: DataVer,
    pub ref_nonce: RefNonce,
}

impl BlockPointer {
    /// Pointer to the first reference of a block
    pub fn new(id: BlockId) -> Self {
        Self {
            id,
            key_gen: KeyGen::FIRST,
            data_ver: DataVer::FIRST,
            ref_nonce: RefNonce::ZERO,
        }
    }

    pub fn with_ref_nonce(mut self, ref_nonce: RefNonce) -> Self {
        self.ref_nonce = ref_nonce;
        self
    }

    pub fn with_key_gen(mut self, key_gen: KeyGen) -> Self {
        self.key_gen = key_gen;
        self
    }

    /// Whether this pointer is well-formed.
    ///  Only the id is checked; key generation and data version
    ///  are opaque to this layer.
    pub fn is_valid(&self) -> bool {
        self.id.is_valid()
    }

    /// Whether this is the "no pointer" sentinel
    pub fn is_zero(&self) -> bool {
        *self == BlockPointer::default()
    }

    /// The identity key derived from this pointer
    pub fn block_ref(&self) -> BlockRef {
        BlockRef {
            id: self.id,
            ref_nonce: self.ref_nonce,
        }
    }
}

impl fmt::Display for BlockPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{} (kg {}, dv {})",
            self.id, self.ref_nonce, self.key_gen.0, self.data_ver.0
        )
    }
}

impl fmt::Debug for BlockPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockPointer")
            .field("id", &self.id)
            .field("ref_nonce", &self.ref_nonce)
            .finish_non_exhaustive()
    }
}

/// Identity of a filesystem object within a node cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockRef {
    pub id: BlockId,
    pub ref_nonce: RefNonce,
}

impl BlockRef {
    pub fn is_valid(&self) -> bool {
        self.id.is_valid()
    }

    /// Whether this is the "no reference" sentinel
    pub fn is_zero(&self) -> bool {
        *self == BlockRef::default()
    }
}

impl fmt::Display for BlockRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.id, self.ref_nonce)
    }
}
