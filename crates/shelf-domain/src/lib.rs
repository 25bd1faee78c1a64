//! Reading-list domain types shared between shelf-core and shelf-server
//!
//! This crate provides the canonical data model for a personal reading list:
//! - Book: A catalogued book with status, reading dates, tags and rating
//! - Collection: A named, ordered view over existing books
//! - UserDocument: Everything one user owns, persisted as a single document
//! - Validation: Required-field checks shared by every write path

pub mod book;
pub mod collection;
pub mod status;
pub mod user;
pub mod validation;

pub use book::*;
pub use collection::*;
pub use status::*;
pub use user::*;
pub use validation::*;
