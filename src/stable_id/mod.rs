//! Validation and allocation of stable identifiers
//!
//! [`IdValidator`] decides whether an identifier is acceptable,
//! [`IdAllocator`] repairs or replaces the ones that are not.
mod allocator;
mod validator;

pub use allocator::IdAllocator;
pub use validator::{IdRejection, IdValidator};
