use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Signs and verifies cookie values with a shared secret.
///
/// A signed value has the form `value|hex(HMAC-SHA256(secret, value))`.
#[derive(Clone)]
pub struct CookieSigner {
    secret: Vec<u8>,
}

impl std::fmt::Debug for CookieSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieSigner").finish_non_exhaustive()
    }
}

impl CookieSigner {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
        }
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.secret).expect("HMAC can accept any key length")
    }

    pub fn make_secure_val(&self, val: &str) -> String {
        let mut mac = self.mac();
        mac.update(val.as_bytes());
        format!("{}|{}", val, hex::encode(mac.finalize().into_bytes()))
    }

    /// Returns the original value if the signature matches, `None` otherwise.
    pub fn check_secure_val(&self, secure_val: &str) -> Option<String> {
        let (val, tag) = secure_val.split_once('|')?;

        // Only the exact lowercase encoding produced by make_secure_val is accepted.
        if tag.len() != 64 || !tag.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
            return None;
        }
        let tag = hex::decode(tag).ok()?;

        let mut mac = self.mac();
        mac.update(val.as_bytes());
        mac.verify_slice(&tag).ok()?;

        Some(val.to_string())
    }
}

/// Generate a random 32-byte hex secret.
pub fn generate_secret() -> String {
    use rand::Rng;
    let bytes: [u8; 32] = rand::thread_rng().gen();
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> CookieSigner {
        CookieSigner::new("test-secret")
    }

    #[test]
    fn round_trip() {
        let s = signer();
        for v in ["1", "42", "", "hello world", "a,b,c"] {
            assert_eq!(s.check_secure_val(&s.make_secure_val(v)).as_deref(), Some(v));
        }
    }

    #[test]
    fn signed_value_has_value_pipe_hex() {
        let signed = signer().make_secure_val("17");
        let (val, tag) = signed.split_once('|').unwrap();
        assert_eq!(val, "17");
        assert_eq!(tag.len(), 64);
    }

    #[test]
    fn tampering_any_character_fails() {
        let s = signer();
        let signed = s.make_secure_val("12345");
        for i in 0..signed.len() {
            let mut bytes = signed.clone().into_bytes();
            bytes[i] = if bytes[i] == b'0' { b'1' } else { b'0' };
            let tampered = String::from_utf8(bytes).unwrap();
            if tampered == signed {
                continue;
            }
            assert_eq!(s.check_secure_val(&tampered), None, "position {i}");
        }
    }

    #[test]
    fn uppercase_tag_is_rejected() {
        let s = signer();
        let signed = s.make_secure_val("7");
        let (val, tag) = signed.split_once('|').unwrap();
        let upper = format!("{}|{}", val, tag.to_uppercase());
        if upper != signed {
            assert_eq!(s.check_secure_val(&upper), None);
        }
    }

    #[test]
    fn missing_separator_fails() {
        assert_eq!(signer().check_secure_val("12345"), None);
    }

    #[test]
    fn value_with_pipe_fails() {
        let s = signer();
        // Verification splits on the first '|', so such values never verify.
        let signed = s.make_secure_val("a|b");
        assert_eq!(s.check_secure_val(&signed), None);
    }

    #[test]
    fn other_secret_fails() {
        let signed = signer().make_secure_val("9");
        assert_eq!(CookieSigner::new("other").check_secure_val(&signed), None);
    }

    #[test]
    fn extra_suffix_fails() {
        let s = signer();
        let signed = format!("{}00", s.make_secure_val("9"));
        assert_eq!(s.check_secure_val(&signed), None);
    }

    #[test]
    fn generated_secrets_differ() {
        let a = generate_secret();
        assert_eq!(a.len(), 64);
        assert_ne!(a, generate_secret());
    }
}
