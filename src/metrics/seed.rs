//! Stable per-vehicle seed.
//!
//! FNV-1a, 32 bit, over the UTF-8 bytes of the vehicle name. The value is
//! identical across processes, platforms and implementations.

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

pub const SEED_MODULUS: u32 = 1000;

pub fn fnv1a_32(input: &str) -> u32 {
    input.bytes().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u32::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

/// `fnv1a_32(name) % 1000`.
pub fn stable_seed(name: &str) -> u32 {
    fnv1a_32(name) % SEED_MODULUS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fnv1a_reference_vectors() {
        assert_eq!(fnv1a_32(""), 0x811c_9dc5);
        assert_eq!(fnv1a_32("a"), 0xe40c_292c);
        assert_eq!(fnv1a_32("foobar"), 0xbf9c_f968);
    }

    #[test]
    fn test_seed_for_fleet_names() {
        assert_eq!(fnv1a_32("TRK-001"), 0x898a_ce82);
        assert_eq!(stable_seed("TRK-001"), 426);
        assert_eq!(stable_seed("TRK-002"), 807);
        assert_eq!(stable_seed("TRK-003"), 188);
    }

    #[test]
    fn test_seed_is_bounded() {
        for name in ["", "x", "PTT-7731", "a much longer vehicle name 12345"] {
            assert!(stable_seed(name) < SEED_MODULUS);
        }
    }
}
