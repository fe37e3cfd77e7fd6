//! Integration tests for the end-to-end merchant workflows: platform
//! detection, per-platform service binding, tenant signup and tenant-scoped
//! request handling.

use std::sync::Arc;

use vendra::prelude::*;
use vendra_tenancy::seeding::merchant_admin_structure;
use vendra_tenancy::{InMemoryCacheProvider, InMemoryDatabaseProvider, InMemoryTenantDirectory};

// A platform-differentiated contract, as application code would declare it
trait PaymentFlow: Send + Sync {
    fn redirect_based(&self) -> bool;
}

struct HostedCheckout;
impl PaymentFlow for HostedCheckout {
    fn redirect_based(&self) -> bool {
        true
    }
}

struct NativeSdkCheckout;
impl PaymentFlow for NativeSdkCheckout {
    fn redirect_based(&self) -> bool {
        false
    }
}

fn registry() -> ContractRegistry {
    let registry = ContractRegistry::new();
    registry
        .register::<dyn PaymentFlow>(
            ApiVersion::V1,
            Platform::Web,
            "HostedCheckout",
            Arc::new(HostedCheckout),
        )
        .unwrap();
    registry
        .register::<dyn PaymentFlow>(
            ApiVersion::V1,
            Platform::Mobile,
            "NativeSdkCheckout",
            Arc::new(NativeSdkCheckout),
        )
        .unwrap();
    registry
}

struct Backends {
    directory: Arc<InMemoryTenantDirectory>,
    provider: Arc<InMemoryDatabaseProvider>,
    cache: Arc<InMemoryCacheProvider>,
}

impl Backends {
    fn new() -> Self {
        Self {
            directory: Arc::new(InMemoryTenantDirectory::new()),
            provider: Arc::new(InMemoryDatabaseProvider::new()),
            cache: Arc::new(InMemoryCacheProvider::new()),
        }
    }

    fn provisioner(&self) -> TenantProvisioner {
        TenantProvisioner::new(
            self.directory.clone(),
            self.provider.clone(),
            self.cache.clone(),
            self.provider.clone(),
            self.provider.clone(),
        )
    }
}

fn signup_request(domain: &str, email: &str) -> CreateTenantRequest {
    CreateTenantRequest::new(
        "Store One",
        domain,
        NewUser::new("Olive Owner", email, "$argon2id$test-hash"),
    )
}

#[tokio::test]
async fn merchant_signup_then_platform_routed_request() {
    let backends = Backends::new();
    let provisioner = backends.provisioner();

    // Merchant signs up with their storefront domain
    let (tenant, owner) = provisioner
        .create_tenant(&signup_request("store1.example.com", "owner@store1.example.com"))
        .await
        .unwrap();
    assert!(tenant.is_active());
    assert_eq!(owner.role, "merchant_admin");

    // A mobile request for that storefront arrives
    let request = RequestDescriptor::new("POST", "/api/v1/checkout")
        .with_header("Host", "store1.example.com")
        .with_header("X-Platform", "mobile");

    let detector = PlatformDetector::new(PlatformConfig::default());
    let target = detector.detect(&Invocation::Http(request.clone())).unwrap();
    assert_eq!(target.platform, Platform::Mobile);

    // The binder hands out the mobile implementation for this request only
    let binder = ServiceBinder::new(registry(), target);
    let flow = binder.bind::<dyn PaymentFlow>().unwrap();
    assert!(!flow.redirect_based());

    // The request resolves to the signed-up tenant and runs in its context
    let resolver = DomainTenantResolver::new(backends.directory.clone());
    let resolved = resolver.resolve(&request).await.unwrap();
    assert_eq!(resolved.id, tenant.id);

    let contexts =
        TenantContextManager::new(backends.provider.clone(), backends.cache.clone());
    let found = contexts
        .run_in_tenant_context(&resolved, |active| {
            let users = backends.provider.clone();
            async move {
                users
                    .find_by_email(active.database().name(), "owner@store1.example.com")
                    .await
            }
        })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found, owner);
    assert!(contexts.is_central());
}

#[tokio::test]
async fn web_and_mobile_requests_bind_different_implementations() {
    let detector = PlatformDetector::new(PlatformConfig::default());
    let registry = registry();

    let web_target = detector
        .detect(&Invocation::Http(
            RequestDescriptor::new("GET", "/api/v1/checkout").with_header("X-Platform", "web"),
        ))
        .unwrap();
    let mobile_target = detector
        .detect(&Invocation::Http(
            RequestDescriptor::new("GET", "/api/v1/checkout").with_header("X-Platform", "mobile"),
        ))
        .unwrap();

    let web = ServiceBinder::new(registry.clone(), web_target);
    let mobile = ServiceBinder::new(registry, mobile_target);

    assert!(web.bind::<dyn PaymentFlow>().unwrap().redirect_based());
    assert!(!mobile.bind::<dyn PaymentFlow>().unwrap().redirect_based());
}

#[tokio::test]
async fn seeded_permissions_match_the_declared_structure() {
    let backends = Backends::new();
    let (tenant, _owner) = backends
        .provisioner()
        .create_tenant(&signup_request("store1.example.com", "owner@store1.example.com"))
        .await
        .unwrap();

    let structure: RoleStructure = serde_json::from_value(serde_json::json!({
        "merchant_admin": {
            "users": "c,r,u,d",
            "roles": "c,r,u,d",
            "products": "c,r,u,d",
            "orders": "c,r,u,d",
            "settings": "r,u"
        }
    }))
    .unwrap();
    assert_eq!(structure, merchant_admin_structure());

    let granted = backends
        .provider
        .permissions_of(&tenant.database_name(), "merchant_admin")
        .await
        .unwrap();
    assert_eq!(granted, structure.slugs_for("merchant_admin"));
    assert!(granted.contains(&"create-products".to_string()));
    assert!(!granted.contains(&"delete-settings".to_string()));
}

#[tokio::test]
async fn duplicate_domain_signup_fails_without_side_effects() {
    let backends = Backends::new();
    let provisioner = backends.provisioner();

    provisioner
        .create_tenant(&signup_request("store1.example.com", "owner@store1.example.com"))
        .await
        .unwrap();

    let result = provisioner
        .create_tenant(&signup_request("store1.example.com", "rival@store2.example.com"))
        .await;
    assert!(matches!(result, Err(TenantError::DuplicateDomain(_))));

    assert_eq!(backends.directory.tenant_count().await.unwrap(), 1);
    assert_eq!(backends.directory.domain_count().await.unwrap(), 1);
    assert_eq!(backends.provider.database_names().len(), 1);
}

#[tokio::test]
async fn suspended_tenant_stops_serving_traffic() {
    let backends = Backends::new();
    let provisioner = backends.provisioner();
    let (tenant, _owner) = provisioner
        .create_tenant(&signup_request("store1.example.com", "owner@store1.example.com"))
        .await
        .unwrap();

    provisioner.suspend_tenant(tenant.id).await.unwrap();

    let resolver = DomainTenantResolver::new(backends.directory.clone());
    let request = RequestDescriptor::new("GET", "/api/v1/orders")
        .with_header("Host", "store1.example.com");
    let result = resolver.resolve(&request).await;
    assert!(matches!(
        result,
        Err(TenantError::NotActive(TenantStatus::Suspended))
    ));

    // Reactivation restores service
    provisioner.activate_tenant(tenant.id).await.unwrap();
    assert!(resolver.resolve(&request).await.unwrap().is_active());
}

#[tokio::test]
async fn dependency_container_serves_shared_services() {
    // Cross-cutting services that are not platform-differentiated live in
    // the container rather than the contract registry.
    struct Pricing {
        tax_rate_bp: u32,
    }

    let container = Container::new();
    container.register(Pricing { tax_rate_bp: 2100 });

    let pricing = container.resolve::<Pricing>().unwrap();
    assert_eq!(pricing.tax_rate_bp, 2100);
}
