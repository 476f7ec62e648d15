//! Route paths shared by the routers, the remote check and tests.

pub const GET_AUTH_CHECK: &str = "/api/v001/auth/check";
pub const GET_AUTH_REFRESH: &str = "/api/v001/auth/refresh";
pub const DELETE_AUTH_LOGOUT: &str = "/api/v001/auth/logout";
pub const POST_AUTH_REGISTER: &str = "/api/v001/auth/register";
pub const POST_AUTH_LOGIN: &str = "/api/v001/auth/login";
/// GET, POST and PUT.
pub const USERS_INFO: &str = "/api/v001/users/info";
pub const GET_ADMIN_USERS_ID: &str = "/api/v001/admin/users/{id}";
pub const GET_USERS_RESUME_LIST: &str = "/api/v001/users/resume/list";
pub const POST_USERS_RESUME: &str = "/api/v001/users/resume";
/// GET and DELETE.
pub const USERS_RESUME_ID: &str = "/api/v001/users/resume/{id}";

/// Concrete path for one resume.
pub fn users_resume(id: u64) -> String {
    USERS_RESUME_ID.replace("{id}", &id.to_string())
}
