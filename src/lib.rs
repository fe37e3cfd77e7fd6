// Vendra - multi-tenant commerce platform core
//
// This facade re-exports the platform detection / dependency routing layer
// and the multi-tenancy layer as one crate.

// Re-export core functionality
pub use vendra_core::*;

// Re-export tenancy under its own namespace; its error and model names
// would otherwise collide with core ones.
pub use vendra_tenancy;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        ApiVersion,
        Container,
        ContractRegistry,
        Error,
        Invocation,
        Platform,
        PlatformConfig,
        PlatformDetector,
        RequestDescriptor,
        ResolvedTarget,
        ServiceBinder,
    };
    pub use vendra_tenancy::prelude::*;
}
