pub mod provider;

pub use provider::NodeProvider;
