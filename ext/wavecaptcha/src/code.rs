use std::collections::HashSet;

use rand::Rng;

/// Lowercase letters without `l` and `o`, then the digits `2` through `9`.
pub static ALPHABET: [char; 32] = [
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'm', 'n', 'p', 'q', 'r', 's', 't', 'u',
    'v', 'w', 'x', 'y', 'z', '2', '3', '4', '5', '6', '7', '8', '9',
];

/// Generate a random code of `len` characters drawn from `alphabet`.
///
/// An empty `alphabet` yields an empty code whatever `len` is.
///
/// With `unique` set a character is redrawn until it has not been used yet.
/// There is no bound on redraws: if `len` exceeds the number of distinct
/// characters in `alphabet` this never returns. `CaptchaBuilder::validate`
/// rejects that combination for [`ALPHABET`].
pub fn generate_code<R: Rng + ?Sized>(
    rng: &mut R,
    len: usize,
    alphabet: &[char],
    unique: bool,
) -> String {
    let mut code = String::with_capacity(len);
    if alphabet.is_empty() {
        return code;
    }

    let mut seen = HashSet::with_capacity(len);
    for _ in 0..len {
        let mut ch = alphabet[rng.gen_range(0..alphabet.len())];
        while unique && !seen.insert(ch) {
            ch = alphabet[rng.gen_range(0..alphabet.len())];
        }
        code.push(ch);
    }
    code
}
