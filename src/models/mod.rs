pub mod catalog_item;
pub mod collection;
pub mod layout_mode;

pub use catalog_item::*;
pub use collection::*;
pub use layout_mode::*;
