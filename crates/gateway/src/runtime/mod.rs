pub mod aggregate;
pub mod format;
pub mod process;
pub mod prompt;

pub use process::{process_request, ProcessInput};
