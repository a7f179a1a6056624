pub mod collection;
pub mod records;

pub use collection::*;
pub use records::*;
