//! Content pointers and identity keys
//!
//! - **[`BlockId`]**: BLAKE3 hash of a block's content
//! - **[`BlockPointer`]**: where an object's content currently lives
//! - **[`BlockRef`]**: the stable identity of an object, derived from the
//!   pointer it had when first seen

mod id;
mod pointer;

pub use id::{BlockId, BlockIdError, RefNonce, BLOCK_ID_SIZE, REF_NONCE_SIZE};
pub use pointer::{BlockPointer, BlockRef, DataVer, KeyGen};
