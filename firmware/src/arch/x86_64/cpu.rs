/// CPU feature detection and the RDRAND block source.
use crate::error::HardwareFault;
use crate::rng::{RandomBlock, BLOCK_WORDS};

/// Intel recommends 10 retries; RDRAND underflow is transient.
const RDRAND_RETRIES: u32 = 32;

/// CPUID.01H:ECX.RDRAND[bit 30].
pub fn has_rdrand() -> bool {
    // `__cpuid` is safe on newer toolchains.
    #[allow(unused_unsafe)]
    let leaf1 = unsafe { core::arch::x86_64::__cpuid(1) };
    leaf1.ecx & (1 << 30) != 0
}

/// Hardware generator producing one block of words per request.
pub struct RdRandBlock {
    _private: (),
}

impl RdRandBlock {
    /// `None` when the CPU has no RDRAND.
    pub fn new() -> Option<Self> {
        if has_rdrand() {
            Some(Self { _private: () })
        } else {
            None
        }
    }

    /// One 32-bit RDRAND with retries. Returns the attempts on failure.
    fn rdrand32() -> Result<u32, u32> {
        for _ in 0..RDRAND_RETRIES {
            let val: u32;
            let ok: u8;
            unsafe {
                core::arch::asm!(
                    "rdrand {val:e}",
                    "setc {ok}",
                    val = out(reg) val,
                    ok = out(reg_byte) ok,
                    options(nostack, nomem),
                );
            }
            if ok != 0 {
                return Ok(val);
            }
        }
        Err(RDRAND_RETRIES)
    }

    /// Seed for the stack's interface config (TCP ISNs, DHCP xids).
    pub fn seed(&mut self) -> Result<u64, HardwareFault> {
        let fault = |status| HardwareFault::RandomGenerate { status };
        let hi = Self::rdrand32().map_err(fault)?;
        let lo = Self::rdrand32().map_err(fault)?;
        Ok(((hi as u64) << 32) | lo as u64)
    }
}

impl RandomBlock<BLOCK_WORDS> for RdRandBlock {
    fn generate(&mut self) -> Result<[u32; BLOCK_WORDS], HardwareFault> {
        let mut block = [0u32; BLOCK_WORDS];
        for word in block.iter_mut() {
            *word = Self::rdrand32().map_err(|status| HardwareFault::RandomGenerate { status })?;
        }
        Ok(block)
    }
}
