// Block hashes.
//
// The weak hash buckets candidate blocks and tolerates collisions; the
// strong hash confirms that two same-length blocks really are equal.

use sha2::{Digest, Sha256};

/// 256-bit strong block digest.
pub type StrongHash = [u8; 32];

/// Adler-32 modulus.
pub const MOD_ADLER: u32 = 65521;

/// Fast non-cryptographic checksum of `block` (Adler-32).
///
/// Used only to find candidate blocks; equal weak hashes never prove
/// equality on their own.
pub fn weak_hash(block: &[u8]) -> u32 {
    #[cfg(feature = "adler32")]
    {
        let mut hasher = simd_adler32::Adler32::new();
        hasher.write(block);
        hasher.finish()
    }
    #[cfg(not(feature = "adler32"))]
    {
        let mut a: u32 = 1;
        let mut b: u32 = 0;
        for &byte in block {
            a = (a + u32::from(byte)) % MOD_ADLER;
            b = (b + a) % MOD_ADLER;
        }
        (b << 16) | a
    }
}

/// SHA-256 digest of `block`.
pub fn strong_hash(block: &[u8]) -> StrongHash {
    Sha256::digest(block).into()
}
