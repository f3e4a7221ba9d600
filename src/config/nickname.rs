//! Anonymous nickname generator.
//!
//! Twitch chat accepts read-only logins for any nickname of the form
//! `justinfanNNNNN`, so that is what a fresh config gets.

use rand::RngExt;

const ANONYMOUS_PREFIX: &str = "justinfan";

/// Generate a random anonymous nickname like `justinfan48213`.
pub fn generate_nickname() -> String {
    let mut rng = rand::rng();
    let num: u32 = rng.random_range(10_000..100_000);
    format!("{}{}", ANONYMOUS_PREFIX, num)
}
