pub mod build_reference;
pub mod qa;
pub mod resolve;
