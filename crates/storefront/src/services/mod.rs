//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Sign-in and sign-up through the identity provider
//! - `checkout` - Form validation, order summary and the order stub

pub mod auth;
pub mod checkout;
