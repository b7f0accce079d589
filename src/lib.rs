// Range-aware media proxy — streams album audio/video/images out of an
// object-storage bucket with HTTP conditional-request and byte-range support.

pub mod config;
pub mod key;
pub mod mime;
pub mod range;
pub mod resolve;
pub mod server;
pub mod store;
