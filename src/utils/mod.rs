pub mod command;
pub mod error;
pub mod format;
pub mod output;
pub mod slug;

pub use output::{print_success, print_warning};
