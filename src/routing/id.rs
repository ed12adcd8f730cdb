//! Deterministic route identity.

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Derive the route id for a host match.
///
/// FNV-1a over the UTF-8 bytes of the match, rendered as lowercase hex
/// without padding. Stable across processes and releases: ids are persisted
/// in the control plane and used for lookup and deletion.
pub fn derive_id(host_match: &str) -> String {
    format!("{:x}", fnv1a64(host_match.as_bytes()))
}

fn fnv1a64(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u64::from(*byte)).wrapping_mul(FNV_PRIME)
    })
}
