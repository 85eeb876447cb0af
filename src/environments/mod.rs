pub mod java;
pub mod node;

pub use java::JavaProvider;
pub use node::NodeProvider;
