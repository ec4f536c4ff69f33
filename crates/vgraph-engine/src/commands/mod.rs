//! Engine operations, grouped by resource
//!
//! Each public operation logs its boundary and runs one synchronous kernel
//! call per lock acquisition.

pub mod branches;
pub mod bulk;
pub mod objects;
pub mod query;
pub mod relationships;
