//! Backend endpoint paths, relative to the configured API base URL.

pub const AUTH_LOGIN: &str = "/auth/login";
pub const AUTH_REGISTER: &str = "/auth/register";
pub const AUTH_REGISTER_ADMIN: &str = "/auth/register-admin";
pub const AUTH_PROFILE: &str = "/auth/profile";
pub const AUTH_REFRESH: &str = "/auth/refresh";
pub const AUTH_LOGOUT: &str = "/auth/logout";

pub const PRODUCTS: &str = "/products";
pub const USERS: &str = "/users";
pub const ORDERS: &str = "/orders";
pub const CART: &str = "/cart";
pub const REVIEWS: &str = "/reviews";
pub const NOTIFICATIONS: &str = "/notifications";

/// `<collection>/<id>` with the id percent-encoded as a single segment.
#[must_use]
pub fn item(collection: &str, id: &str) -> String {
    format!("{collection}/{}", encode_segment(id))
}

/// `<collection>/<id>/<suffix>`.
#[must_use]
pub fn item_action(collection: &str, id: &str, suffix: &str) -> String {
    format!("{}/{suffix}", item(collection, id))
}

/// `<collection>/<scope>/<id>`, e.g. `/orders/user/{id}`.
#[must_use]
pub fn scoped(collection: &str, scope: &str, id: &str) -> String {
    format!("{collection}/{scope}/{}", encode_segment(id))
}

/// Percent-encode one path segment (RFC 3986 unreserved characters pass through).
#[must_use]
pub fn encode_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
            out.push(char::from(byte));
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}
