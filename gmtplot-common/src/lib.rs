pub mod value;

pub use value::{OptionValue, Scalar, ValueKind};
