//! # Mint
//!
//! Contract snapshot, eligibility rules, transaction submission, and the
//! session object that holds them together for one user.

pub mod eligibility;
pub mod error;
pub mod session;
pub mod state;
pub mod submitter;
pub mod view;

pub use eligibility::{
    clamp_quantity, evaluate, max_public_quantity, public_payment, validate_quantity,
    whitelist_payment, Eligibility, EligibilityInput, StatusMessage,
};
pub use error::MintError;
pub use session::MintSession;
pub use state::MintPhaseState;
pub use submitter::TransactionSubmitter;
pub use view::{render, MintView, ViewInput};
