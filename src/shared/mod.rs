//! Shared utilities used across the tunnel client and its HTTP surface.

pub mod status_text;
pub mod timing;

pub use status_text::status_text;
pub use timing::DetailedTiming;
