// Core library for the Vendra platform
// Platform detection, API version resolution, and typed contract binding

pub mod binder;
pub mod container;
pub mod error;
pub mod http;
pub mod logging;
pub mod platform;
pub mod registry;
pub mod version;

// Re-export commonly used types
pub use binder::ServiceBinder;
pub use container::Container;
pub use error::Error;
pub use http::{Invocation, RequestDescriptor};
pub use platform::{Platform, PlatformConfig, PlatformDetector, ResolvedTarget};
pub use registry::ContractRegistry;
pub use version::ApiVersion;
