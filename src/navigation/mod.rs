//! Navigation middlewares.
//!
//! Every navigation runs through a [`MiddlewareChain`]: the auth gate first, then the
//! maintenance guard and the access policy, which all share one [`NavigationContext`].

pub mod access;
pub mod base;
pub mod gate_middleware;
pub mod maintenance;
pub mod navigator;

pub use base::{
    matches_prefix, Decision, MiddlewareChain, Navigation, NavigationContext, RouteMiddleware,
};
pub use navigator::{NavigationOutcome, Navigator};
