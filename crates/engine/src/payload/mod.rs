//! Wire payload construction for the review-platform API.
//!
//! Builders turn host records into the exact JSON shapes the upstream
//! endpoints expect. They perform no I/O; the client sends what they build.

mod invitation;
mod product;

pub use invitation::*;
pub use product::*;
