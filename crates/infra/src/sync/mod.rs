//! Operation wire encoding

pub mod codec;

pub use codec::{JsonOperationCodec, JSON_CONTENT_TYPE};
