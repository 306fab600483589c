use std::sync::Arc;

use tracing::debug;

use super::guard::{evaluate, NavigationDecision, Redirect, SessionView, REDIRECT_PARAM};
use super::routes::RouteTable;
use crate::store::TokenStore;

/// Runs the guard against the live session for each navigation.
pub struct Navigator {
    table: RouteTable,
    tokens: Arc<TokenStore>,
}

impl Navigator {
    pub fn new(table: RouteTable, tokens: Arc<TokenStore>) -> Self {
        Navigator { table, tokens }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Decides whether `full_path` may be entered right now.
    pub fn navigate(&self, full_path: &str) -> NavigationDecision {
        let Some(target) = self.table.resolve(full_path) else {
            debug!("No route matches '{}'", full_path);
            return NavigationDecision::NotFound;
        };
        let session = SessionView::from_credentials(&self.tokens.snapshot());
        let decision = evaluate(target.route, &target.full_path, &session);
        debug!(
            route = target.route.name.as_str(),
            authenticated = session.authenticated,
            ?decision,
            "Navigation to '{}'",
            full_path
        );
        decision
    }

    /// The concrete location a redirect points at, e.g. `/login?redirect=%2Fbookmarks`.
    pub fn location(&self, redirect: &Redirect) -> String {
        let path = self
            .table
            .by_name(&redirect.route)
            .map(|r| r.path.clone())
            .unwrap_or_else(|| "/".to_string());

        match &redirect.redirect {
            Some(destination) => {
                match serde_urlencoded::to_string([(REDIRECT_PARAM, destination.as_str())]) {
                    Ok(query) => format!("{}?{}", path, query),
                    Err(_) => path,
                }
            }
            None => path,
        }
    }

    /// Where to go once login succeeds. Only in-app paths are honoured.
    pub fn post_login_destination(redirect: Option<&str>) -> String {
        match redirect {
            Some(dest) if is_in_app_path(dest) => dest.to_string(),
            _ => "/".to_string(),
        }
    }
}

fn is_in_app_path(dest: &str) -> bool {
    dest.starts_with('/') && !dest.starts_with("//") && !dest.contains('\\')
}
