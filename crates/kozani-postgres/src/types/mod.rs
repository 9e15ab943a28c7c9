//! Database enums and constraint violation mapping.

mod constraint;
mod enums;

pub use constraint::{ConstraintCategory, ConstraintViolation, MessageConstraints, UserConstraints};
pub use enums::MessageRole;
