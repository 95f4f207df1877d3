//! Login wall: decides where a screen must redirect for the current auth
//! state and follows session transitions.

use std::fmt;

use tokio::sync::watch;

use crate::common::AuthState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteGroup {
    /// Login and registration screens.
    Auth,
    /// Everything behind the login wall.
    Protected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Home,
}

impl Route {
    pub fn group(&self) -> RouteGroup {
        match self {
            Self::Login => RouteGroup::Auth,
            Self::Home => RouteGroup::Protected,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Home => "/",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

pub fn redirect_for(state: AuthState, group: RouteGroup) -> Option<Route> {
    match (state, group) {
        (AuthState::Anonymous, RouteGroup::Protected) => Some(Route::Login),
        (AuthState::Authenticated, RouteGroup::Auth) => Some(Route::Home),
        _ => None,
    }
}

/// Tracks the current screen group and reacts to session transitions.
pub struct NavigationGuard {
    receiver: watch::Receiver<AuthState>,
    group: RouteGroup,
}

impl NavigationGuard {
    pub fn new(receiver: watch::Receiver<AuthState>, group: RouteGroup) -> Self {
        Self { receiver, group }
    }

    pub fn group(&self) -> RouteGroup {
        self.group
    }

    /// Redirect needed right now, if any. Applying it moves the guard.
    pub fn check(&mut self) -> Option<Route> {
        let state = *self.receiver.borrow_and_update();
        let route = redirect_for(state, self.group)?;
        self.group = route.group();
        Some(route)
    }

    /// Waits for the next transition that requires a redirect. Returns
    /// `None` once the session manager is gone.
    pub async fn next_redirect(&mut self) -> Option<Route> {
        loop {
            if self.receiver.changed().await.is_err() {
                return None;
            }
            if let Some(route) = self.check() {
                log::info!("Redirecting to {route}");
                return Some(route);
            }
        }
    }
}
