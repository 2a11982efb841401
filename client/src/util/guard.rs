//! Role-gated route guard.
//!
//! SYSTEM CONTEXT
//! ==============
//! Protected areas wrap their content in a [`ProtectedRoute`] with the roles
//! allowed in. While auth is loading the guard shows a placeholder; once it
//! settles it either shows the content or renders nothing and redirects:
//! unauthenticated users to `/login`, users of another role to their own
//! home area (see [`RoleRoutes`]).
//!
//! The decision is recomputed on every render. The redirect side effect runs
//! only when one of its inputs (loading flag, user, allow-list) changed since
//! the previous render.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use accounts::{LOGIN_ROUTE, Role, RoleRedirect, RoleRoutes, RouteTableError, User};
use tracing::warn;

use super::navigate::Navigator;
use crate::state::auth::AuthState;

/// What the guard concluded for one set of inputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    /// Auth state has not settled yet.
    Wait,
    /// Nobody is signed in.
    SignIn,
    /// Signed in, but the role is not allowed here.
    Reroute(RoleRedirect),
    Grant,
}

impl GuardDecision {
    /// Route to navigate to, if this decision redirects.
    #[must_use]
    pub fn redirect_path(self) -> Option<&'static str> {
        match self {
            Self::SignIn => Some(LOGIN_ROUTE),
            Self::Reroute(redirect) => Some(redirect.path()),
            Self::Wait | Self::Grant => None,
        }
    }

    #[must_use]
    pub fn outlet(self) -> Outlet {
        match self {
            Self::Wait => Outlet::Placeholder,
            Self::SignIn | Self::Reroute(_) => Outlet::Nothing,
            Self::Grant => Outlet::Children,
        }
    }
}

/// What the guarded area should render.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outlet {
    /// Loading indicator.
    Placeholder,
    /// Nothing at all; a redirect is pending.
    Nothing,
    /// The protected content.
    Children,
}

/// Pure guard decision for the given auth state and allow-list.
#[must_use]
pub fn decide(state: &AuthState, allowed: &[Role], routes: &RoleRoutes) -> GuardDecision {
    if state.loading {
        return GuardDecision::Wait;
    }
    let Some(user) = &state.user else {
        return GuardDecision::SignIn;
    };
    if user.known_role().is_ok_and(|role| allowed.contains(&role)) {
        GuardDecision::Grant
    } else {
        GuardDecision::Reroute(routes.redirect_for(&user.role))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Inputs {
    loading: bool,
    user: Option<User>,
    allowed: Vec<Role>,
}

/// Stateful guard for one protected area.
#[derive(Debug)]
pub struct ProtectedRoute {
    allowed: Vec<Role>,
    routes: RoleRoutes,
    observed: Option<Inputs>,
}

impl ProtectedRoute {
    pub fn new(allowed: impl Into<Vec<Role>>, routes: RoleRoutes) -> Self {
        Self { allowed: allowed.into(), routes, observed: None }
    }

    /// Guard using the app's standard role-to-route table.
    ///
    /// # Errors
    ///
    /// Fails if the standard table does not cover every role.
    pub fn standard(allowed: impl Into<Vec<Role>>) -> Result<Self, RouteTableError> {
        Ok(Self::new(allowed, RoleRoutes::standard()?))
    }

    #[must_use]
    pub fn allowed(&self) -> &[Role] {
        &self.allowed
    }

    pub fn set_allowed(&mut self, allowed: impl Into<Vec<Role>>) {
        self.allowed = allowed.into();
    }

    /// Decide for the current state without side effects.
    #[must_use]
    pub fn decide(&self, state: &AuthState) -> GuardDecision {
        decide(state, &self.allowed, &self.routes)
    }

    /// Render the guard: returns what to show and, when the inputs changed
    /// and the decision is a redirect, navigates.
    pub fn render(&mut self, state: &AuthState, navigator: &dyn Navigator) -> Outlet {
        let decision = self.decide(state);
        let inputs = Inputs { loading: state.loading, user: state.user.clone(), allowed: self.allowed.clone() };

        if self.observed.as_ref() != Some(&inputs) {
            self.observed = Some(inputs);
            if let GuardDecision::Reroute(RoleRedirect::Unmapped) = decision {
                let role = state.user.as_ref().map_or("", |u| u.role.as_str());
                warn!(role, "user role has no route; sending to login");
            }
            if let Some(path) = decision.redirect_path() {
                navigator.navigate(path);
            }
        }

        decision.outlet()
    }
}
