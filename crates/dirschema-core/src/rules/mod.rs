//! Pure schema rules applied to entries before they are forwarded

pub mod attributes;
pub mod dn_fix;
pub mod sorter;

pub use attributes::fix_check_attributes;
pub use dn_fix::fix_dn;
pub use sorter::{last_structural_class, sort_object_classes, validate_class_names, ClassChain};
