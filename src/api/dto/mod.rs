//! Data Transfer Objects for REST response serialization.

pub mod system_dto;

pub use system_dto::*;
