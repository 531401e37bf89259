// src/utils/token.rs

use rand::{
    Rng,
    distributions::{Distribution, Uniform},
};

/// Length of a generated QR token. 43 symbols of 6 bits each.
pub const QR_TOKEN_LEN: usize = 43;

struct UrlSafe;

impl Distribution<char> for UrlSafe {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> char {
        const CHARSET: &[u8] =
            b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

        let range = Uniform::new(0, CHARSET.len());
        CHARSET[range.sample(rng)] as char
    }
}

/// Generates the token that identifies an exercise in its completion URL.
///
/// Callers pass a cryptographically secure generator (`rand::thread_rng()`).
pub fn generate_qr_token<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..QR_TOKEN_LEN).map(|_| rng.sample(UrlSafe)).collect()
}

/// Public completion link for a token, relative to the configured base URL.
pub fn completion_url(base_url: &str, qr_token: &str) -> String {
    match url::Url::parse(base_url).and_then(|base| base.join(&format!("complete/{}", qr_token))) {
        Ok(url) => url.to_string(),
        Err(_) => format!("{}complete/{}", base_url, qr_token),
    }
}
