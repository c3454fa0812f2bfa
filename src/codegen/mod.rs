pub mod entity;
pub mod generator;
pub mod property;
pub mod template;
pub mod type_map;

pub use generator::CodeGenerator;
