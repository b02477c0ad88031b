//! Pieces shared by the node binary and the application crates.

pub mod logging;
