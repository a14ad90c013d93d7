pub mod command;
pub mod extract;
pub mod info;
pub mod output;
pub mod progress;
pub mod wrap;
