//! Collaborator contracts injected into the payment client.
//!
//! Access-token retrieval and bill-number generation live outside the signing core. The
//! client only depends on the traits below, so callers can plug in their own token cache or
//! id service; simple default implementations ship alongside.

pub mod access_token;
pub mod bill_no;

pub use access_token::*;
pub use bill_no::*;
