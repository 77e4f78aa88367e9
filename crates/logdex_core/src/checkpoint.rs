//! Checkpoint persistence.
//!
//! The checkpoint is an opaque token produced by the host. It is stored
//! hex-encoded under [`CHECKPOINT_KEY`] in the same store as the index
//! entries. Index keys always start with the text tag byte, so a key
//! starting with `0xFF` can never collide with them.

use crate::error::{CoreError, CoreResult};
use logdex_storage::KvStore;

/// Reserved store key holding the checkpoint.
pub const CHECKPOINT_KEY: &[u8] = b"\xFF__checkpoint";

/// Persists `token`, replacing any earlier checkpoint.
///
/// # Errors
///
/// Propagates store failures.
pub fn store_checkpoint(store: &dyn KvStore, token: &[u8]) -> CoreResult<()> {
    store.put(CHECKPOINT_KEY, hex::encode(token).as_bytes())?;
    tracing::debug!(bytes = token.len(), "stored checkpoint");
    Ok(())
}

/// Reads the checkpoint back.
///
/// Returns `Ok(None)` when no checkpoint has been stored yet.
///
/// # Errors
///
/// Propagates store failures, and returns [`CoreError::InvalidCheckpoint`]
/// if the stored text does not decode.
pub fn fetch_checkpoint(store: &dyn KvStore) -> CoreResult<Option<Vec<u8>>> {
    let Some(stored) = store.get(CHECKPOINT_KEY)? else {
        return Ok(None);
    };
    hex::decode(&stored)
        .map(Some)
        .map_err(|e| CoreError::InvalidCheckpoint {
            message: e.to_string(),
        })
}
