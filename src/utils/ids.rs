use std::sync::LazyLock;

use argon2::password_hash::rand_core::{OsRng, RngCore};
use regex::Regex;

/// Length of a student uid.
pub const UID_LEN: usize = 28;

const UID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

static ROUTE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9]{28}$").expect("static pattern"));

/// Bytes at or above this are discarded so every character is equally likely.
const ACCEPT_BELOW: u8 = (256 / UID_ALPHABET.len() * UID_ALPHABET.len()) as u8;

fn alphabet_char(byte: u8) -> Option<char> {
    (byte < ACCEPT_BELOW).then(|| UID_ALPHABET[byte as usize % UID_ALPHABET.len()] as char)
}

/// Generates a random alphanumeric uid of `UID_LEN` characters.
pub fn new_uid() -> String {
    let mut uid = String::with_capacity(UID_LEN);
    let mut bytes = [0u8; UID_LEN];
    while uid.len() < UID_LEN {
        OsRng.fill_bytes(&mut bytes);
        for ch in bytes.iter().filter_map(|b| alphabet_char(*b)) {
            if uid.len() == UID_LEN {
                break;
            }
            uid.push(ch);
        }
    }
    uid
}

/// Whether `id` has the shape of a student uid as embedded in routes.
pub fn is_valid_route_id(id: &str) -> bool {
    ROUTE_ID.is_match(id)
}
