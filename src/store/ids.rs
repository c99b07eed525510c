//! Short id generation
//!
//! Globally-unique short string ids: 21 characters drawn from the 64-char
//! URL-safe alphabet, the id shape every row in the store uses. 126 bits
//! of randomness, so collisions are not a practical concern.

use rand::Rng;

const ID_ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";
const ID_LENGTH: usize = 21;

/// Generates a new 21-character id.
pub fn generate_id() -> String {
    let mut rng = rand::thread_rng();
    (0..ID_LENGTH)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect()
}
