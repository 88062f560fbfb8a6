pub mod quote;
pub mod launch;

pub use quote::*;
pub use launch::*;
