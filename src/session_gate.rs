//! Session gate: decides, once per page load, whether the current view
//! may render or must redirect.
//!
//! Protected pages redirect to the login view when no session exists;
//! the login and registration views redirect to the dashboard when one
//! does. The gate starts `Unknown` and settles after the first
//! observation, and it hands out at most one redirect per page load so
//! an auth hiccup can never bounce the UI in a loop.

use tracing::debug;

// ═══════════════════════════════════════════════════════════
// States and decisions
// ═══════════════════════════════════════════════════════════

/// Authentication state as last observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// No observation yet this page load.
    Unknown,
    Authenticated,
    Unauthenticated,
}

/// Kind of view asking to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    /// Dashboard, recorder, reports, appointments, account, medical info.
    Protected,
    /// Login and registration.
    Entry,
}

/// The gate's answer for a page load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Render the requested view.
    Allow,
    /// Send the user to the login view.
    RedirectToLogin,
    /// Signed-in user on an entry view; send them to the dashboard.
    RedirectToDashboard,
}

// ═══════════════════════════════════════════════════════════
// Gate
// ═══════════════════════════════════════════════════════════

/// Per-page-load gate. Construct (or `begin_page_load`) fresh for each
/// navigation.
pub struct SessionGate {
    state: AuthState,
    redirect_issued: bool,
}

impl SessionGate {
    pub fn new() -> Self {
        Self {
            state: AuthState::Unknown,
            redirect_issued: false,
        }
    }

    /// Reset for a fresh navigation: state is re-observed and a new
    /// redirect may be issued.
    pub fn begin_page_load(&mut self) {
        self.state = AuthState::Unknown;
        self.redirect_issued = false;
    }

    /// Record an auth observation (from the persisted session or a
    /// provider callback).
    pub fn observe(&mut self, authenticated: bool) {
        let next = if authenticated {
            AuthState::Authenticated
        } else {
            AuthState::Unauthenticated
        };
        if self.state != next {
            debug!(?next, "Session gate state settled");
        }
        self.state = next;
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    /// Decide whether `page` may render. `Unknown` allows the render
    /// (the page shows its loading shell) until an observation lands.
    /// At most one redirect is issued per page load.
    pub fn decide(&mut self, page: PageKind) -> GateDecision {
        let wanted = match (self.state, page) {
            (AuthState::Unauthenticated, PageKind::Protected) => GateDecision::RedirectToLogin,
            (AuthState::Authenticated, PageKind::Entry) => GateDecision::RedirectToDashboard,
            _ => GateDecision::Allow,
        };
        if wanted != GateDecision::Allow {
            if self.redirect_issued {
                return GateDecision::Allow;
            }
            self.redirect_issued = true;
        }
        wanted
    }
}

impl Default for SessionGate {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
