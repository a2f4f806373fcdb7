//! Login screen controller.

pub mod controller;

pub use controller::LoginController;
