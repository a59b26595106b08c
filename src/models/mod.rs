mod devices;
mod photos;
pub mod timestamp;

pub use devices::*;
pub use photos::*;

#[cfg(test)]
pub(crate) use devices::fixtures;
