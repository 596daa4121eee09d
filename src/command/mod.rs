//! Text command protocol: parsing request lines and producing replies.

pub mod interpreter;
pub mod parser;

pub use interpreter::*;
pub use parser::{Command, parse};
