pub mod http_client;
pub mod platform;

#[cfg(test)]
pub(crate) mod testing;

pub use http_client::{HttpClient, HttpTransport};
pub use platform::Platform;
