mod interface;
pub use interface::*;
