pub mod display;
pub mod realizer;
pub mod text;
