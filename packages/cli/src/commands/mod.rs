pub mod classes;
pub mod encode;

pub use classes::{classes, ClassesArgs};
pub use encode::{encode, EncodeArgs};
