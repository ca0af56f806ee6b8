mod interface;
mod uniform;
pub use interface::*;
pub use uniform::*;

#[cfg(test)]
mod tests;
