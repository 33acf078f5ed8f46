pub mod consensus;

pub use consensus::consensus;
