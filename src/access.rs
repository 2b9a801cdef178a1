//! Route gating. Authentication belongs to an external identity provider;
//! parent mode is only granted through that provider's credential check.

use log::{info, warn};
use serde::Serialize;

pub trait IdentityProvider: Send + Sync {
    fn is_authenticated(&self) -> bool;

    /// Confirms the parent's credential. Never a hard-coded secret.
    fn verify_parent(&self, credential: &str) -> bool;
}

#[derive(Debug, Default)]
pub struct ParentGate {
    unlocked: bool,
}

impl ParentGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    pub fn unlock(&mut self, identity: &dyn IdentityProvider, credential: &str) -> bool {
        if identity.is_authenticated() && identity.verify_parent(credential) {
            info!("Parent mode unlocked");
            self.unlocked = true;
        } else {
            warn!("Parent credential rejected");
        }
        self.unlocked
    }

    pub fn lock(&mut self) {
        self.unlocked = false;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Route {
    Landing,
    Profiles,
    StudySession,
    ParentDashboard,
    EditProfile(String),
    Auth,
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Landing => "/".into(),
            Route::Profiles => "/profiles".into(),
            Route::StudySession => "/study-session".into(),
            Route::ParentDashboard => "/parent-dashboard".into(),
            Route::EditProfile(id) => format!("/edit-profile/{id}"),
            Route::Auth => "/auth".into(),
        }
    }

    pub fn requires_login(&self) -> bool {
        !matches!(self, Route::Landing | Route::Auth)
    }

    pub fn requires_parent(&self) -> bool {
        matches!(self, Route::ParentDashboard | Route::EditProfile(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Access {
    Allow,
    RedirectToLogin,
    RedirectToProfiles,
}

pub fn guard(route: &Route, identity: &dyn IdentityProvider, gate: &ParentGate) -> Access {
    if route.requires_login() && !identity.is_authenticated() {
        return Access::RedirectToLogin;
    }
    if route.requires_parent() && !gate.is_unlocked() {
        return Access::RedirectToProfiles;
    }
    Access::Allow
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeIdentity {
        signed_in: bool,
    }

    impl IdentityProvider for FakeIdentity {
        fn is_authenticated(&self) -> bool {
            self.signed_in
        }

        fn verify_parent(&self, credential: &str) -> bool {
            credential == "correct horse"
        }
    }

    #[test]
    fn anonymous_users_are_sent_to_login() {
        let identity = FakeIdentity { signed_in: false };
        let gate = ParentGate::new();
        assert_eq!(guard(&Route::Landing, &identity, &gate), Access::Allow);
        assert_eq!(
            guard(&Route::StudySession, &identity, &gate),
            Access::RedirectToLogin
        );
    }

    #[test]
    fn parent_routes_need_unlocked_gate() {
        let identity = FakeIdentity { signed_in: true };
        let mut gate = ParentGate::new();
        let route = Route::EditProfile("1".into());
        assert_eq!(guard(&route, &identity, &gate), Access::RedirectToProfiles);

        assert!(!gate.unlock(&identity, "1234"));
        assert!(gate.unlock(&identity, "correct horse"));
        assert_eq!(guard(&route, &identity, &gate), Access::Allow);
        assert_eq!(route.path(), "/edit-profile/1");

        gate.lock();
        assert_eq!(
            guard(&Route::ParentDashboard, &identity, &gate),
            Access::RedirectToProfiles
        );
    }

    #[test]
    fn signed_out_provider_cannot_unlock() {
        let identity = FakeIdentity { signed_in: false };
        let mut gate = ParentGate::new();
        assert!(!gate.unlock(&identity, "correct horse"));
    }
}
