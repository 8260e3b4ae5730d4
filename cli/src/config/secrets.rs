//! Secret generation

use rand::distributions::{Alphanumeric, DistString};
use rand::rngs::OsRng;

/// Length of generated JWT and auth secrets
pub const SECRET_LENGTH: usize = 64;

/// Generate a random alphanumeric string of `length` characters.
///
/// Draws from the operating system's CSPRNG. `OsRng` panics if the OS source
/// fails; there is no fallback to a weaker generator.
pub fn generate_secret(length: usize) -> String {
    Alphanumeric.sample_string(&mut OsRng, length)
}
