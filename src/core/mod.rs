pub mod bind;
pub mod classify;
pub mod decode;
pub mod emit;
pub mod error;
pub mod failure;
pub mod limit;
