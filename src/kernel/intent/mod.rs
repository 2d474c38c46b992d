pub mod interpreter;
pub mod types;

pub use interpreter::{classify, extract_number, extract_search_query};
pub use types::{Intent, IntentKind};
