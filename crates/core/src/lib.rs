//! Core business logic for lendlocal.

pub mod services;

pub use services::*;
