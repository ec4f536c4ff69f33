pub mod branch;
pub mod entity;
pub mod properties;

pub use branch::{branch_key, normalize_branch_id, Branch};
pub use entity::{EntityContent, EntityKind, EntityVersion};
pub use properties::Properties;
