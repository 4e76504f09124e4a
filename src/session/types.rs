use serde::{Deserialize, Serialize};

/// JWT claims structure containing session information
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionClaims {
    pub session_id: String,
    pub username: String,
    pub exp: usize, // Expiration timestamp (standard JWT claim)
    pub iat: usize, // Issued at timestamp (standard JWT claim)
}

/// Response structure for session creation endpoint
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionResponse {
    pub token: String, // The JWT, sent back as a Bearer token
    pub session_id: String,
    pub username: String,
}

/// The caller's session after lookup-or-create
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSession {
    pub token: String,
    pub session_id: String,
    pub username: String,
    /// True when no usable session was presented and a new one was issued
    pub created: bool,
}
