//! Terminal UI and HTTP front end for ManualQA

mod server;
mod ui;


pub use server::{router, run_server};
pub use ui::{display_banner, handle_input_with_history, print_answer, print_help};

// Re-export core types
pub use manualqa_core::{Error, Result};
