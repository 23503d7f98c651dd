//! Browser-driven challenge solving.
//!
//! Opens the provider's anti-automation interstitial in Chromium and waits
//! for it to clear, returning the page the browser lands on.

pub mod error;
pub mod fingerprint;
pub mod solver;

pub use error::{BrowserError, Result};
pub use fingerprint::FingerprintConfig;
pub use solver::BrowserSolver;
