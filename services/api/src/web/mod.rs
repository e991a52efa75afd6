pub mod rest;
pub mod state;

// Re-export the handlers to make them easily accessible
// to the binary that will build the web server router.
pub use rest::{check_citations_handler, list_citations_handler};
