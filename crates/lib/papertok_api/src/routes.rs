//! Route paths.

pub const GET_HEALTH: &str = "/health";

pub const POST_AUTH_REGISTER: &str = "/api/v1/auth/register";
pub const POST_AUTH_LOGIN: &str = "/api/v1/auth/login";
pub const POST_AUTH_REFRESH: &str = "/api/v1/auth/refresh";
pub const GET_AUTH_PROFILE: &str = "/api/v1/auth/profile";

pub const GET_PAPERS: &str = "/api/v1/papers";
pub const GET_PAPERS_SEARCH: &str = "/api/v1/papers/search";
pub const GET_PAPERS_ID: &str = "/api/v1/papers/{id}";
