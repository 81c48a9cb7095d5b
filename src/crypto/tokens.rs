use rand::{distributions::Slice, rngs::OsRng, Rng};

/// The alphabet opaque identifiers and tokens are drawn from.
const ALPHABET: [char; 36] = [
    '1', '2', '3', '4', '5', '6', '7', '8', '9', '0', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i',
    'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

/// The length of a row identifier.
const ID_LEN: usize = 12;

/// The length of an access or refresh token.
const TOKEN_LEN: usize = 25;

/// Draws `len` characters uniformly from the alphabet using the OS RNG.
fn random_string(len: usize) -> String {
    let dist = Slice::new(&ALPHABET).expect("alphabet is non-empty");
    OsRng.sample_iter(&dist).take(len).copied().collect()
}

/// Generates a short opaque row identifier.
pub fn generate_id() -> String {
    random_string(ID_LEN)
}

/// Generates an opaque session token. Tokens carry no embedded structure;
/// resolving one always requires a store lookup.
pub fn generate_token() -> String {
    random_string(TOKEN_LEN)
}
