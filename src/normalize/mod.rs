pub mod columns;
pub mod dates;
pub mod length;

pub use columns::{digits_only, Column, HeaderIndex};
pub use dates::coerce_date;
pub use length::{FieldLengthValidator, LengthViolation};
