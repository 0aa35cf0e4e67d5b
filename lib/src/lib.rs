//! Wire-level pieces shared by the murmur chat relay: constants, protocol
//! texts, the read-one-message framing, and identity types.

pub mod constants;
pub mod protocol;
pub mod types;
