//! # Blogicum Core
//!
//! The domain layer of the Blogicum blog.
//! This crate contains pure business logic with zero infrastructure dependencies:
//! entities, the visibility gate, pagination, forms and the [`BlogService`]
//! operations built on the repository ports.

pub mod domain;
pub mod error;
pub mod forms;
pub mod pagination;
pub mod ports;
pub mod service;
pub mod visibility;

pub use error::{DomainError, RepoError};
pub use service::{Access, BlogService, Outcome, Repositories, Submission};
