//! # Gatehouse Auth
//!
//! Credential validation for proxy inbounds.
//!
//! ## Model
//!
//! - Every credential has a mandatory [`Token`] (a UUID or a hashed secret)
//! - A credential may carry a label (the user email), unique per store and
//!   compared case-insensitively
//! - Listing and counting only ever see labeled credentials; anonymous
//!   credentials are reachable by token alone

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod credential;
pub mod error;
pub mod token;
pub mod validator;

pub use credential::{Account, Credential, User};
pub use error::AuthError;
pub use token::{parse_user_id, HexDigest, Token};
pub use validator::Validator;
