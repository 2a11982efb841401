use super::*;
use crate::util::navigate::HistoryNavigator;

fn routes() -> RoleRoutes {
    RoleRoutes::standard().unwrap()
}

fn user_with_role(role: &str) -> User {
    User { id: 1, username: role.to_owned(), role: role.to_owned(), member_id: None, visitor_id: None }
}

fn signed_in(role: &str) -> AuthState {
    AuthState::signed_in(user_with_role(role))
}

// =============================================================================
// decide
// =============================================================================

#[test]
fn waits_while_loading() {
    let state = AuthState { user: Some(user_with_role("pastor")), loading: true };
    assert_eq!(decide(&state, &[Role::Pastor], &routes()), GuardDecision::Wait);
}

#[test]
fn unauthenticated_goes_to_login() {
    let decision = decide(&AuthState::signed_out(), &[Role::Pastor], &routes());
    assert_eq!(decision, GuardDecision::SignIn);
    assert_eq!(decision.redirect_path(), Some("/login"));
}

#[test]
fn allowed_role_is_granted() {
    assert_eq!(decide(&signed_in("deacon"), &[Role::Pastor, Role::Deacon], &routes()), GuardDecision::Grant);
}

#[test]
fn every_disallowed_role_goes_to_its_mapped_route() {
    let expected = [
        ("pastor", "/pastor"),
        ("treasurer", "/treasurer"),
        ("deacon", "/deacon"),
        ("member", "/lgpd"),
        ("visitor", "/lgpd"),
    ];
    for (role, path) in expected {
        let decision = decide(&signed_in(role), &[], &routes());
        assert_eq!(decision.redirect_path(), Some(path), "role {role}");
    }
}

#[test]
fn unmapped_role_goes_to_login() {
    let decision = decide(&signed_in("bishop"), &[Role::Pastor], &routes());
    assert_eq!(decision, GuardDecision::Reroute(RoleRedirect::Unmapped));
    assert_eq!(decision.redirect_path(), Some("/login"));
}

#[test]
fn reroute_matches_table_lookup() {
    let table = routes();
    for role in ["pastor", "treasurer", "deacon", "member", "visitor", "bishop", ""] {
        let decision = decide(&signed_in(role), &[], &table);
        assert_eq!(decision, GuardDecision::Reroute(table.redirect_for(role)), "role {role:?}");
    }
}

#[test]
fn empty_allow_list_grants_nobody() {
    assert_ne!(decide(&signed_in("pastor"), &[], &routes()), GuardDecision::Grant);
}

// =============================================================================
// render: outlet contract
// =============================================================================

#[test]
fn loading_renders_placeholder_without_navigation() {
    let nav = HistoryNavigator::new();
    let mut guard = ProtectedRoute::new([Role::Pastor], routes());
    assert_eq!(guard.render(&AuthState::loading(), &nav), Outlet::Placeholder);
    assert!(nav.history().is_empty());
}

#[test]
fn unauthenticated_renders_nothing_and_redirects() {
    let nav = HistoryNavigator::new();
    let mut guard = ProtectedRoute::new([Role::Pastor], routes());
    assert_eq!(guard.render(&AuthState::signed_out(), &nav), Outlet::Nothing);
    assert_eq!(nav.current().as_deref(), Some("/login"));
}

#[test]
fn unauthorized_never_renders_children() {
    let nav = HistoryNavigator::new();
    let mut guard = ProtectedRoute::new([Role::Treasurer], routes());
    for _ in 0..3 {
        assert_eq!(guard.render(&signed_in("member"), &nav), Outlet::Nothing);
    }
}

#[test]
fn authorized_renders_children() {
    let nav = HistoryNavigator::new();
    let mut guard = ProtectedRoute::new([Role::Pastor], routes());
    assert_eq!(guard.render(&signed_in("pastor"), &nav), Outlet::Children);
    assert!(nav.history().is_empty());
}

// =============================================================================
// render: dependency tracking
// =============================================================================

#[test]
fn unchanged_inputs_do_not_redirect_twice() {
    let nav = HistoryNavigator::new();
    let mut guard = ProtectedRoute::new([Role::Pastor], routes());
    guard.render(&AuthState::signed_out(), &nav);
    guard.render(&AuthState::signed_out(), &nav);
    assert_eq!(nav.history(), vec!["/login".to_owned()]);
}

#[test]
fn settling_after_loading_redirects() {
    let nav = HistoryNavigator::new();
    let mut guard = ProtectedRoute::new([Role::Pastor], routes());
    guard.render(&AuthState::loading(), &nav);
    guard.render(&signed_in("visitor"), &nav);
    assert_eq!(nav.history(), vec!["/lgpd".to_owned()]);
}

#[test]
fn user_change_is_reevaluated() {
    let nav = HistoryNavigator::new();
    let mut guard = ProtectedRoute::new([Role::Pastor], routes());
    assert_eq!(guard.render(&signed_in("pastor"), &nav), Outlet::Children);
    assert_eq!(guard.render(&signed_in("deacon"), &nav), Outlet::Nothing);
    assert_eq!(nav.history(), vec!["/deacon".to_owned()]);
}

#[test]
fn allow_list_change_is_reevaluated() {
    let nav = HistoryNavigator::new();
    let mut guard = ProtectedRoute::new([Role::Pastor], routes());
    assert_eq!(guard.render(&signed_in("pastor"), &nav), Outlet::Children);

    guard.set_allowed([Role::Treasurer]);
    assert_eq!(guard.allowed(), &[Role::Treasurer]);
    assert_eq!(guard.render(&signed_in("pastor"), &nav), Outlet::Nothing);
    assert_eq!(nav.current().as_deref(), Some("/pastor"));
}

#[test]
fn standard_guard_builds() {
    let guard = ProtectedRoute::standard([Role::Member, Role::Visitor]).unwrap();
    assert_eq!(guard.decide(&signed_in("visitor")), GuardDecision::Grant);
}
