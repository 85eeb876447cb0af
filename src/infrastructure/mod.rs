pub mod archive;
pub mod config;
pub mod filesystem;
pub mod logging;
pub mod remote;
pub mod settings;

pub use config::Config;
pub use filesystem::FileSystem;
pub use remote::{HttpClient, HttpTransport, Platform};
pub use settings::{Settings, SettingsStore};
