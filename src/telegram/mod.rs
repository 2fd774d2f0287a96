pub mod client;
pub mod messenger;
pub mod types;

pub use client::*;
pub use messenger::*;
pub use types::*;
