#![doc = include_str!("../README.md")]

mod batch;
mod error;
mod generator;
mod rand;
mod session;
mod sink;
mod thread_random;

pub use crate::batch::*;
pub use crate::error::*;
pub use crate::generator::*;
pub use crate::rand::*;
pub use crate::session::*;
pub use crate::sink::*;
pub use crate::thread_random::*;
