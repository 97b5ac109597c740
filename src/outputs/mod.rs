//! Digest output: rendering and delivery.
//!
//! # Submodules
//!
//! - [`html`]: renders summaries into the HTML digest and its subject line
//! - [`email`]: sends the rendered digest to the configured recipient

pub mod email;
pub mod html;
