pub mod audio;
pub mod config;
pub mod console;
pub mod driver;
pub mod kernel;
pub mod outputs;
pub mod services;

// Re-export specific items if needed for convenient access
pub use driver::{Components, Driver};
pub use kernel::intent::{classify, extract_number, Intent};
pub use kernel::reactor::Reactor;
