use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub const HOME_ROUTE: &str = "home";
pub const LOGIN_ROUTE: &str = "login";
pub const SIGNUP_ROUTE: &str = "signup";
pub const ONBOARDING_ROUTE: &str = "onboarding";

/// Who may enter a route.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum RouteAccess {
    Public,
    RequiresAuth,
    /// Only for visitors who are not signed in (login, signup).
    RequiresGuest,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RouteDescriptor {
    /// Pattern such as `/books/:id`; `:name` segments capture parameters.
    pub path: String,
    pub name: String,
    pub view: String,
    pub access: RouteAccess,
}

impl RouteDescriptor {
    pub fn new(path: &str, name: &str, view: &str, access: RouteAccess) -> Self {
        RouteDescriptor {
            path: path.to_string(),
            name: name.to_string(),
            view: view.to_string(),
            access,
        }
    }

    /// Captured parameters when `path` matches this route's pattern.
    pub fn matches(&self, path: &str) -> Option<HashMap<String, String>> {
        let pattern: Vec<&str> = segments(&self.path).collect();
        let actual: Vec<&str> = segments(path).collect();
        if pattern.len() != actual.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (expected, got) in pattern.iter().zip(actual.iter()) {
            match expected.strip_prefix(':') {
                Some(name) => {
                    params.insert(name.to_string(), (*got).to_string());
                }
                None if expected == got => {}
                None => return None,
            }
        }
        Some(params)
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// A resolved navigation target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    pub route: &'a RouteDescriptor,
    pub params: HashMap<String, String>,
    /// The path as requested, query string included.
    pub full_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    routes: Vec<RouteDescriptor>,
}

impl RouteTable {
    pub fn new(routes: Vec<RouteDescriptor>) -> Self {
        RouteTable { routes }
    }

    pub fn routes(&self) -> &[RouteDescriptor] {
        &self.routes
    }

    pub fn by_name(&self, name: &str) -> Option<&RouteDescriptor> {
        self.routes.iter().find(|r| r.name == name)
    }

    /// First route (in table order) whose pattern matches; the query string is
    /// ignored for matching.
    pub fn resolve(&self, full_path: &str) -> Option<RouteMatch<'_>> {
        let path = full_path.split(['?', '#']).next().unwrap_or(full_path);
        self.routes.iter().find_map(|route| {
            route.matches(path).map(|params| RouteMatch {
                route,
                params,
                full_path: full_path.to_string(),
            })
        })
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        use RouteAccess::*;
        RouteTable::new(vec![
            RouteDescriptor::new("/", HOME_ROUTE, "HomeView", Public),
            RouteDescriptor::new("/login", LOGIN_ROUTE, "LoginView", RequiresGuest),
            RouteDescriptor::new("/signup", SIGNUP_ROUTE, "SignupView", RequiresGuest),
            RouteDescriptor::new("/onboarding", ONBOARDING_ROUTE, "OnboardingView", RequiresAuth),
            RouteDescriptor::new("/search", "search", "SearchView", Public),
            RouteDescriptor::new("/bestsellers", "bestsellers", "BestSellerView", Public),
            RouteDescriptor::new("/books/:id", "book-detail", "BookDetailView", Public),
            RouteDescriptor::new("/bookmarks", "bookmarks", "BookmarkView", RequiresAuth),
            RouteDescriptor::new("/profile", "profile", "ProfileView", RequiresAuth),
        ])
    }
}
