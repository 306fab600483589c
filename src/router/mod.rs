//! Route table and navigation guard.

pub mod guard;
pub mod navigator;
pub mod routes;

pub use guard::{evaluate, NavigationDecision, Redirect, SessionView, REDIRECT_PARAM};
pub use navigator::Navigator;
pub use routes::{
    RouteAccess, RouteDescriptor, RouteMatch, RouteTable, HOME_ROUTE, LOGIN_ROUTE,
    ONBOARDING_ROUTE, SIGNUP_ROUTE,
};
