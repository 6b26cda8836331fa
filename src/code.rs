use rand::Rng;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub const CODE_LENGTH: usize = 5;

/// Random payment code of [`CODE_LENGTH`] uppercase alphanumerics.
pub fn generate_code<R: Rng>(rng: &mut R) -> String {
    (0..CODE_LENGTH)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Canonical form of a code typed in by a payer.
pub fn normalize_code(input: &str) -> String {
    input.trim().to_ascii_uppercase()
}
