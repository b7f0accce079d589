// HTTP surface — axum router and the media request handler.

pub mod handler;
