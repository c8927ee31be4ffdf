pub mod formatters;
pub mod pipeline;
pub mod predicate;
pub mod sort;
pub mod state;
pub mod types;
pub mod url_state;
