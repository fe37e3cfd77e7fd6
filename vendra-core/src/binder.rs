//! Service Binder
//!
//! Binds abstract contracts to concrete instances for one unit of work,
//! parameterized by the platform target the detector resolved. A binder is
//! constructed per request and thrown away with it: the same process serves
//! requests for multiple platforms concurrently, so bindings are never cached
//! across requests.

use crate::error::Error;
use crate::platform::ResolvedTarget;
use crate::registry::ContractRegistry;
use std::any::type_name;
use std::sync::Arc;
use tracing::debug;

/// Per-unit-of-work binder over the contract registry
pub struct ServiceBinder {
    registry: ContractRegistry,
    target: ResolvedTarget,
}

impl ServiceBinder {
    pub fn new(registry: ContractRegistry, target: ResolvedTarget) -> Self {
        Self { registry, target }
    }

    /// The resolved target this binder serves
    pub fn target(&self) -> ResolvedTarget {
        self.target
    }

    /// Bind contract `C` to the concrete registered for this binder's
    /// platform.
    ///
    /// Scans the candidate list in insertion order; the first entry whose
    /// declared platform matches wins. A missing binding is a deployment
    /// defect and fails hard with [`Error::NoImplementationFound`] — it is
    /// never silently defaulted.
    pub fn bind<C>(&self) -> Result<Arc<C>, Error>
    where
        C: ?Sized + Send + Sync + 'static,
    {
        let entries = self.registry.entries_for::<C>(self.target.version);

        for entry in &entries {
            if entry.platform == self.target.platform {
                let instance = entry
                    .instance
                    .clone()
                    .downcast::<Arc<C>>()
                    .map_err(|_| {
                        Error::Internal(format!(
                            "registry entry for '{}' holds an unexpected type",
                            type_name::<C>()
                        ))
                    })?;

                debug!(
                    contract = type_name::<C>(),
                    concrete = entry.concrete,
                    platform = %self.target.platform,
                    "Contract bound"
                );
                return Ok(Arc::clone(&instance));
            }
        }

        Err(Error::NoImplementationFound {
            contract: type_name::<C>().to_string(),
            platform: self.target.platform.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Platform;
    use crate::version::ApiVersion;

    trait CheckoutService: Send + Sync {
        fn surface(&self) -> &'static str;
    }

    struct WebCheckout;
    impl CheckoutService for WebCheckout {
        fn surface(&self) -> &'static str {
            "web"
        }
    }

    struct MobileCheckout;
    impl CheckoutService for MobileCheckout {
        fn surface(&self) -> &'static str {
            "mobile"
        }
    }

    fn registry() -> ContractRegistry {
        let registry = ContractRegistry::new();
        registry
            .register::<dyn CheckoutService>(
                ApiVersion::V1,
                Platform::Web,
                "WebCheckout",
                Arc::new(WebCheckout),
            )
            .unwrap();
        registry
            .register::<dyn CheckoutService>(
                ApiVersion::V1,
                Platform::Mobile,
                "MobileCheckout",
                Arc::new(MobileCheckout),
            )
            .unwrap();
        registry
    }

    fn target(platform: Platform) -> ResolvedTarget {
        ResolvedTarget {
            version: ApiVersion::V1,
            platform,
        }
    }

    #[test]
    fn binds_the_matching_platform() {
        let binder = ServiceBinder::new(registry(), target(Platform::Mobile));
        let service = binder.bind::<dyn CheckoutService>().unwrap();
        assert_eq!(service.surface(), "mobile");
    }

    #[test]
    fn binding_is_deterministic() {
        let binder = ServiceBinder::new(registry(), target(Platform::Web));
        for _ in 0..10 {
            let service = binder.bind::<dyn CheckoutService>().unwrap();
            assert_eq!(service.surface(), "web");
        }
    }

    #[test]
    fn missing_binding_fails_hard() {
        let binder = ServiceBinder::new(
            registry(),
            ResolvedTarget {
                version: ApiVersion::V2,
                platform: Platform::Web,
            },
        );
        let result = binder.bind::<dyn CheckoutService>();
        match result {
            Err(Error::NoImplementationFound { contract, platform }) => {
                assert!(contract.contains("CheckoutService"));
                assert_eq!(platform, "web");
            }
            other => panic!("expected NoImplementationFound, got {:?}", other.err()),
        }
    }

    #[test]
    fn binders_with_different_platforms_coexist() {
        let registry = registry();
        let web = ServiceBinder::new(registry.clone(), target(Platform::Web));
        let mobile = ServiceBinder::new(registry, target(Platform::Mobile));

        assert_eq!(web.bind::<dyn CheckoutService>().unwrap().surface(), "web");
        assert_eq!(
            mobile.bind::<dyn CheckoutService>().unwrap().surface(),
            "mobile"
        );
    }
}
