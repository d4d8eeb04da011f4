//! Session and resolve-token signing

mod jwt;

pub use jwt::{JwtService, SessionClaims, TokenKind};
