//! Protocol Front Ends
//!
//! - [`csi`]: Container Storage Interface front end

pub mod csi;
