use rand::Rng;
use sha2::{Digest, Sha256};

const SALT_LEN: usize = 5;
const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Generate a random salt of ASCII letters.
pub fn make_salt() -> String {
    let mut rng = rand::thread_rng();
    (0..SALT_LEN)
        .map(|_| char::from(LETTERS[rng.gen_range(0..LETTERS.len())]))
        .collect()
}

/// Hash a username/password pair. Returns `"salt,hash"` where the hash is
/// the hex SHA-256 of `name ++ pw ++ salt`. A fresh salt is drawn when none
/// is given.
pub fn make_pw_hash(name: &str, pw: &str, salt: Option<&str>) -> String {
    let salt = match salt {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => make_salt(),
    };

    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    hasher.update(pw.as_bytes());
    hasher.update(salt.as_bytes());
    let digest = hex::encode(hasher.finalize());

    format!("{},{}", salt, digest)
}

/// Check a password against a stored `"salt,hash"` value.
pub fn valid_pw(name: &str, pw: &str, stored: &str) -> bool {
    let salt = stored.split(',').next().unwrap_or("");
    if salt.is_empty() {
        return false;
    }
    make_pw_hash(name, pw, Some(salt)) == stored
}
