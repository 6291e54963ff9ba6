pub mod bridge;
pub mod engine;
pub mod lua;
pub mod value;
