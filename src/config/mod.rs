// src/config/mod.rs
pub mod credentials;
pub mod search;

pub use credentials::{Capabilities, CredentialSource};
pub use search::SearchSettings;
