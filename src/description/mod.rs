//! Read-only descriptions of types and methods, as supplied by the surrounding
//! code generator.

pub mod descriptor;
pub mod hierarchy;
pub mod method;
pub mod types;

pub use descriptor::{parse_method_descriptor, parse_type_descriptor};
pub use hierarchy::{ClassHierarchy, TypeHierarchy};
pub use method::{MethodDescription, MethodModifiers, SignatureKey, CONSTRUCTOR_NAME};
pub use types::{PrimitiveType, TypeDescription};
