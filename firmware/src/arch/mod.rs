/// Architecture support for boards built on a PC-class CPU.
#[cfg(target_arch = "x86_64")]
pub mod x86_64;
