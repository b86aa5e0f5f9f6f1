//! 저장소 레코드 → 신원 → 테넌트 범위 통합 테스트

use fieldserve_core::{CompanyId, CoreError, Role, TenantScope, TenantScopeError, UserRecord};

fn record(role: &str, company_id: i64) -> UserRecord {
    UserRecord {
        id: 42,
        email: "tech@example.com".to_string(),
        password_hash: "$argon2id$placeholder".to_string(),
        role: role.to_string(),
        company_id,
    }
}

#[test]
fn test_stored_user_becomes_tenant_bound_scope() {
    let identity = record("Supervisor", 5).into_identity().unwrap();
    let scope = TenantScope::for_caller(identity.role, identity.company_id);

    assert_eq!(identity.role, Role::Supervisor);
    assert_eq!(scope.company_filter(), Some(CompanyId(5)));
    assert_eq!(scope.narrow(None).unwrap(), scope);
    assert_eq!(
        scope.narrow(Some(CompanyId(6))),
        Err(TenantScopeError::CrossTenant {
            own: CompanyId(5),
            requested: CompanyId(6),
        })
    );
    assert_eq!(scope.write_target(None).unwrap(), CompanyId(5));
}

#[test]
fn test_platform_admin_scope_spans_companies() {
    let identity = record("platform_admin", 1).into_identity().unwrap();
    let scope = TenantScope::for_caller(identity.role, identity.company_id);

    assert_eq!(identity.role, Role::PlatformAdmin);
    assert_eq!(scope.company_filter(), None);
    assert!(scope.permits(CompanyId(1234)));
    assert_eq!(
        scope.narrow(Some(CompanyId(7))).unwrap().company_filter(),
        Some(CompanyId(7))
    );
    assert_eq!(scope.write_target(Some(CompanyId(7))).unwrap(), CompanyId(7));
    assert_eq!(scope.write_target(None).unwrap(), CompanyId(1));
}

#[test]
fn test_unknown_stored_role_is_rejected() {
    let err = record("Owner", 1).into_identity().unwrap_err();
    assert!(matches!(err, CoreError::UnknownRole(role) if role == "Owner"));
}

#[test]
fn test_only_platform_admin_crosses_tenants() {
    let crossing: Vec<Role> = Role::ALL
        .into_iter()
        .filter(|role| role.has_cross_tenant_visibility())
        .collect();

    assert_eq!(crossing, vec![Role::PlatformAdmin]);
}
