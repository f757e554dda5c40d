pub mod json_file;

pub use json_file::{backup_books, decode_books, read_books, write_books};
