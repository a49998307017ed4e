//! # Blogicum Shared
//!
//! Types that cross the HTTP boundary. Handlers build these from domain
//! values; clients and tests read them back.

pub mod dto;
pub mod response;

pub use response::{Document, ErrorResponse};
