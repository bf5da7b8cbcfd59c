//! Credential primitives: bcrypt hashing and JWT issuance.

mod bcrypt;
mod jwt;

pub use bcrypt::BcryptPasswordHasher;
pub use jwt::{JwtTokenService, TOKEN_TTL_HOURS};
