//! API gateway: a single entry point in front of the two services.

mod proxy;

pub use proxy::{proxy_handler, UpstreamProxy};
