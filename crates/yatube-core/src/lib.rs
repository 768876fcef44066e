//! # Yatube Core
//!
//! The domain layer of Yatube.
//! Entities, form validation, pagination and the services that enforce
//! authorization rules. Storage, caching and hashing are reached only
//! through the traits in [`ports`].

pub mod domain;
pub mod error;
pub mod forms;
pub mod pagination;
pub mod ports;
pub mod services;

pub use error::{DomainError, FieldErrors};
pub use pagination::{Page, Paginator};
