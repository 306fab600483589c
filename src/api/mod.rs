//! Thin wrappers over the backend endpoints, one function per call.

pub mod accounts;
pub mod books;
