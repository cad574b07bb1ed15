pub mod cli;

pub use cli::{finish, general_error, general_note, use_color};
