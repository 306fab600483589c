use serde::Serialize;

use super::routes::{RouteAccess, RouteDescriptor, HOME_ROUTE, LOGIN_ROUTE, ONBOARDING_ROUTE};
use crate::models::CredentialSet;

/// Query parameter carrying the destination to resume after login.
pub const REDIRECT_PARAM: &str = "redirect";

/// The part of the session the guard cares about.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionView {
    pub authenticated: bool,
    /// The cached profile exists and has not finished onboarding. An unknown
    /// profile never forces onboarding.
    pub needs_onboarding: bool,
}

impl SessionView {
    pub fn from_credentials(credentials: &CredentialSet) -> Self {
        let authenticated = credentials.is_authenticated();
        SessionView {
            authenticated,
            needs_onboarding: authenticated
                && credentials
                    .user
                    .as_ref()
                    .is_some_and(|user| user.needs_onboarding()),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    /// Name of the route to go to instead.
    pub route: String,
    /// In-app destination to resume afterwards, if any.
    pub redirect: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "decision", rename_all = "kebab-case")]
pub enum NavigationDecision {
    Allow,
    Redirect(Redirect),
    NotFound,
}

impl NavigationDecision {
    fn redirect_to(route: &str, redirect: Option<&str>) -> Self {
        NavigationDecision::Redirect(Redirect {
            route: route.to_string(),
            redirect: redirect.map(str::to_string),
        })
    }
}

/// Decides a single route transition. The first matching rule wins:
/// protected routes send guests to login (remembering where they were going),
/// guest-only routes send signed-in readers home, and readers who have not
/// finished onboarding are sent there first.
pub fn evaluate(target: &RouteDescriptor, full_path: &str, session: &SessionView) -> NavigationDecision {
    if target.access == RouteAccess::RequiresAuth && !session.authenticated {
        return NavigationDecision::redirect_to(LOGIN_ROUTE, Some(full_path));
    }
    if target.access == RouteAccess::RequiresGuest && session.authenticated {
        return NavigationDecision::redirect_to(HOME_ROUTE, None);
    }
    if session.authenticated && session.needs_onboarding && target.name != ONBOARDING_ROUTE {
        return NavigationDecision::redirect_to(ONBOARDING_ROUTE, None);
    }
    NavigationDecision::Allow
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserProfile;
    use crate::router::routes::RouteTable;

    const GUEST: SessionView = SessionView {
        authenticated: false,
        needs_onboarding: false,
    };
    const MEMBER: SessionView = SessionView {
        authenticated: true,
        needs_onboarding: false,
    };
    const NEWCOMER: SessionView = SessionView {
        authenticated: true,
        needs_onboarding: true,
    };

    fn route(name: &str) -> RouteDescriptor {
        RouteTable::default()
            .by_name(name)
            .cloned()
            .expect("route exists")
    }

    #[test]
    fn test_guest_is_sent_to_login_with_destination() {
        let decision = evaluate(&route("bookmarks"), "/bookmarks?page=2", &GUEST);
        assert_eq!(
            decision,
            NavigationDecision::Redirect(Redirect {
                route: LOGIN_ROUTE.to_string(),
                redirect: Some("/bookmarks?page=2".to_string()),
            })
        );
    }

    #[test]
    fn test_member_is_sent_home_from_guest_routes() {
        for name in [LOGIN_ROUTE, "signup"] {
            let decision = evaluate(&route(name), "/login", &MEMBER);
            assert_eq!(
                decision,
                NavigationDecision::Redirect(Redirect {
                    route: HOME_ROUTE.to_string(),
                    redirect: None,
                })
            );
        }
    }

    #[test]
    fn test_newcomer_is_sent_to_onboarding() {
        let decision = evaluate(&route("book-detail"), "/books/3", &NEWCOMER);
        assert_eq!(
            decision,
            NavigationDecision::Redirect(Redirect {
                route: ONBOARDING_ROUTE.to_string(),
                redirect: None,
            })
        );
        assert_eq!(
            evaluate(&route(ONBOARDING_ROUTE), "/onboarding", &NEWCOMER),
            NavigationDecision::Allow
        );
    }

    #[test]
    fn test_guest_only_rule_beats_onboarding() {
        let decision = evaluate(&route(LOGIN_ROUTE), "/login", &NEWCOMER);
        assert_eq!(
            decision,
            NavigationDecision::Redirect(Redirect {
                route: HOME_ROUTE.to_string(),
                redirect: None,
            })
        );
    }

    #[test]
    fn test_public_and_allowed_routes() {
        assert_eq!(evaluate(&route(HOME_ROUTE), "/", &GUEST), NavigationDecision::Allow);
        assert_eq!(evaluate(&route(LOGIN_ROUTE), "/login", &GUEST), NavigationDecision::Allow);
        assert_eq!(evaluate(&route("profile"), "/profile", &MEMBER), NavigationDecision::Allow);
    }

    #[test]
    fn test_session_view_from_credentials() {
        let mut creds = CredentialSet {
            access_token: Some("a".to_string()),
            refresh_token: Some("r".to_string()),
            user: None,
        };
        assert_eq!(SessionView::from_credentials(&creds), MEMBER);

        creds.user = Some(UserProfile::new("reader"));
        assert_eq!(SessionView::from_credentials(&creds), NEWCOMER);

        creds.access_token = None;
        assert_eq!(SessionView::from_credentials(&creds), GUEST);
    }
}
