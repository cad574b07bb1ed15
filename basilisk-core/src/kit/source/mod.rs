pub mod byte_source;
pub mod cursor;

pub use byte_source::{ByteSource, ReaderSource};
pub use cursor::{CursorError, SourceCursor};
