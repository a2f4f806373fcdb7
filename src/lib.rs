//! Casal login — credential sign-in and post-login onboarding routing.

pub mod auth;
pub mod config;
pub mod error;
pub mod login;
pub mod navigation;
pub mod onboarding;
pub mod store;
