pub mod artifact;
pub mod block_file;
pub mod conversion;
pub mod definition;

pub use artifact::*;
pub use block_file::BlockFile;
pub use conversion::*;
pub use definition::*;
