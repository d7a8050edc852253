//! WIQL generation and repair.
//!
//! [`builder`] turns chat commands and global filters into queries;
//! [`validate`] repairs queries from the untrusted upstream generator so no
//! grammar-violating fragment ever reaches the backend.

pub mod builder;
pub mod validate;

pub use builder::{Command, build_query, parse_id_token};
pub use validate::{ValidatedQuery, validate_and_fix_query};
