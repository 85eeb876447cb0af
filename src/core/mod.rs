pub mod constants;
pub mod provider;
pub mod registry;
pub mod runtime;
pub mod service;
pub mod setup;

pub use provider::Provider;
pub use registry::ProviderRegistry;
pub use runtime::RuntimeKind;
pub use service::{InstalledVersion, RuntimeService};
pub use setup::{apply_project, ProjectFile};
