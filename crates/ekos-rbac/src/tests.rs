//! Unit tests for ekos-rbac

use proptest::prelude::*;
use test_case::test_case;

use crate::{AccessError, Permission, Principal, Role};

const PERMISSIONS: [Permission; 3] = [
    Permission::ReadReports,
    Permission::WriteReports,
    Permission::ManageCatalog,
];

#[test_case(Role::Admin, &PERMISSIONS; "admin has everything")]
#[test_case(Role::Inspector, &[Permission::ReadReports, Permission::WriteReports]; "inspector reads and writes")]
#[test_case(Role::Viewer, &[Permission::ReadReports]; "viewer reads")]
fn role_grants(role: Role, granted: &[Permission]) {
    for permission in PERMISSIONS {
        assert_eq!(
            role.allows(permission),
            granted.contains(&permission),
            "{role} / {permission}"
        );
    }
}

#[test]
fn enforce_reports_role_and_permission() {
    let viewer = Principal::new("u-9", "vera", Role::Viewer);

    assert_eq!(
        viewer.enforce(Permission::WriteReports),
        Err(AccessError::Denied {
            role: Role::Viewer,
            permission: Permission::WriteReports,
        })
    );
    assert!(viewer.enforce(Permission::ReadReports).is_ok());
}

#[test]
fn denial_message_is_readable() {
    let err = Principal::new("u-9", "vera", Role::Viewer)
        .enforce(Permission::ManageCatalog)
        .unwrap_err();

    assert_eq!(err.to_string(), "role 'viewer' may not manage catalog");
}

#[test]
fn only_viewers_are_company_scoped() {
    let viewer = Principal::new("u-1", "v", Role::Viewer).with_company("ACME");
    let inspector = Principal::new("u-2", "i", Role::Inspector).with_company("ACME");
    let unbound = Principal::new("u-3", "w", Role::Viewer);
    let blank = Principal::new("u-4", "b", Role::Viewer).with_company("");

    assert_eq!(viewer.company_scope(), Some("ACME"));
    assert_eq!(inspector.company_scope(), None);
    assert_eq!(unbound.company_scope(), None);
    assert_eq!(blank.company_scope(), None);
}

#[test]
fn role_serializes_lowercase_and_defaults_to_viewer() {
    assert_eq!(serde_json::to_string(&Role::Inspector).unwrap(), "\"inspector\"");

    let principal: Principal =
        serde_json::from_str(r#"{"user_id":"u-1","username":"ali"}"#).unwrap();
    assert_eq!(principal.role, Role::Viewer);
    assert_eq!(principal.company, None);
}

proptest! {
    #[test]
    fn prop_write_implies_read(role in prop::sample::select(Role::ALL.to_vec())) {
        if role.can_write() {
            prop_assert!(role.allows(Permission::ReadReports));
        }
    }

    #[test]
    fn prop_only_admin_manages(role in prop::sample::select(Role::ALL.to_vec())) {
        prop_assert_eq!(role.allows(Permission::ManageCatalog), role == Role::Admin);
    }
}
