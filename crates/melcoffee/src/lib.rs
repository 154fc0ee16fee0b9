//! Coffee catalog service with preference-based recommendations.
//!
//! The [`recommend`] module holds the pure scoring engine; [`catalog`] owns the
//! stored menu and its HTTP surface; [`auth`] guards the admin mutations.

pub mod auth;
pub mod catalog;
pub mod config;
pub mod error;
pub mod recommend;
pub mod telemetry;
