mod hash;
mod key;

pub mod error;
pub mod random;

pub use error::CryptoError;
pub use hash::*;
pub use key::*;
