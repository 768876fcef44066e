//! # Yatube Shared
//!
//! Wire-level types exchanged with whatever renders the pages.

pub mod dto;
pub mod response;

pub use response::{ErrorResponse, RenderedPage};
