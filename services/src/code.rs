//! One-shot random token generation for QR sessions.

use rand::Rng;

/// Uppercase letters and digits, matching what camera scanners decode most
/// reliably.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Fixed token width.
pub const CODE_LENGTH: usize = 8;

/// Safety valve against alphabet exhaustion or a broken uniqueness check;
/// with 36^8 possible tokens this is not an expected runtime path.
pub const MAX_GENERATION_ATTEMPTS: u32 = 10;

/// Draws a uniformly random code. Uniqueness is the caller's concern.
pub fn random_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CODE_LENGTH)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}
