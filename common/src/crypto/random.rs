//! Cryptographically secure random number generation
//!
//! Ticket secrets, id nonces and request ids are drawn from the operating
//! system's CSPRNG. `thread_rng()` MUST NOT be used for any of them.

use rand::rngs::OsRng;
use rand::RngCore;

/// Generate cryptographically secure random bytes
///
/// # Example
/// ```
/// use disco_common::crypto::random::secure_random_bytes;
///
/// let nonce = secure_random_bytes::<32>();
/// assert_eq!(nonce.len(), 32);
/// ```
pub fn secure_random_bytes<const N: usize>() -> [u8; N] {
    let mut bytes = [0u8; N];
    OsRng.fill_bytes(&mut bytes);
    bytes
}
