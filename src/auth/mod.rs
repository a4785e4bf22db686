pub mod cookie;
pub mod password;
pub mod session;
pub mod validation;

pub use cookie::CookieSigner;
pub use password::{make_pw_hash, valid_pw};
