//! Static role-to-route table.
//!
//! DESIGN
//! ======
//! Each role has a home area. A route guard that refuses a user sends them
//! to their home area; anything it cannot place goes to the login route. The
//! table is checked against [`Role::ALL`] when built, so a role added to the
//! enum without a route fails at startup instead of silently defaulting.

use crate::role::Role;

/// Route every unauthenticated or unplaceable user is sent to.
pub const LOGIN_ROUTE: &str = "/login";

const STANDARD_ROUTES: [(Role, &str); 5] = [
    (Role::Pastor, "/pastor"),
    (Role::Treasurer, "/treasurer"),
    (Role::Deacon, "/deacon"),
    (Role::Member, "/lgpd"),
    (Role::Visitor, "/lgpd"),
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteTableError {
    #[error("role {0} has no route")]
    Unmapped(Role),
    #[error("role {0} is mapped more than once")]
    Duplicate(Role),
}

/// Outcome of looking up a role string in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleRedirect {
    /// Known role with a home route.
    Mapped(&'static str),
    /// The role string names no known role.
    Unmapped,
}

impl RoleRedirect {
    /// Route to navigate to; unmapped roles go to [`LOGIN_ROUTE`].
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Mapped(path) => path,
            Self::Unmapped => LOGIN_ROUTE,
        }
    }
}

/// Validated role-to-route lookup table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleRoutes {
    entries: Vec<(Role, &'static str)>,
}

impl RoleRoutes {
    /// Build a table, requiring exactly one entry per known role.
    ///
    /// # Errors
    ///
    /// Returns [`RouteTableError::Duplicate`] if a role appears twice and
    /// [`RouteTableError::Unmapped`] if a known role is missing.
    pub fn new(entries: &[(Role, &'static str)]) -> Result<Self, RouteTableError> {
        for (i, (role, _)) in entries.iter().enumerate() {
            if entries[..i].iter().any(|(seen, _)| seen == role) {
                return Err(RouteTableError::Duplicate(*role));
            }
        }
        if let Some(missing) = Role::ALL
            .into_iter()
            .find(|role| !entries.iter().any(|(r, _)| r == role))
        {
            return Err(RouteTableError::Unmapped(missing));
        }
        Ok(Self { entries: entries.to_vec() })
    }

    /// The app's standard table.
    ///
    /// # Errors
    ///
    /// Fails only if the built-in table stops covering [`Role::ALL`].
    pub fn standard() -> Result<Self, RouteTableError> {
        Self::new(&STANDARD_ROUTES)
    }

    /// Home route for a known role.
    #[must_use]
    pub fn home(&self, role: Role) -> &'static str {
        self.entries
            .iter()
            .find(|(r, _)| *r == role)
            .map_or(LOGIN_ROUTE, |(_, path)| *path)
    }

    /// Look up a raw role string as carried on a [`crate::User`].
    #[must_use]
    pub fn redirect_for(&self, role: &str) -> RoleRedirect {
        match role.parse::<Role>() {
            Ok(role) => RoleRedirect::Mapped(self.home(role)),
            Err(_) => RoleRedirect::Unmapped,
        }
    }
}

#[cfg(test)]
#[path = "routes_test.rs"]
mod tests;
