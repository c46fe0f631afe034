pub mod clone;
pub mod push;
