pub mod decoder;

pub use decoder::{decode, fletcher16, verify_checksum};
