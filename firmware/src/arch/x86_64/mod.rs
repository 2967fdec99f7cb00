/// x86_64 building blocks for a `Board`: RDRAND as a `RandomBlock` source.
pub mod cpu;

pub use cpu::RdRandBlock;
