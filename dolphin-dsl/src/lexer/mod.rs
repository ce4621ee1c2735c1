//! Lexer module for Dolphin highlighting

pub mod scanner;
pub mod token;

pub use scanner::*;
pub use token::*;
