use crate::constants::hash::{FNV1A64_OFFSET, FNV1A64_PRIME};

/// FNV-1a 64-bit hash of `value`; identical across builds and platforms.
pub fn stable_hash_str(value: &str) -> u64 {
    let mut hash = FNV1A64_OFFSET;
    for byte in value.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(FNV1A64_PRIME);
    }
    hash
}
