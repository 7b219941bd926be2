/// Filesystem adapters for file I/O operations
mod file_reader;
mod file_writer;
mod rooted_fs;

pub use file_reader::FileSystemReader;
pub use file_writer::{FileSystemWriter, StdoutPresenter};
pub use rooted_fs::RootedFileSystem;
