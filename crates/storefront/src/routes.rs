//! Page routes and their access rules.
//!
//! Guards are advisory navigation hints for a client. They are trivially
//! bypassed and are not an access-control boundary; the backend must check
//! the bearer token itself.

use core::fmt;

use brimline_core::{OrderId, ProductId, Role};

use crate::stores::AuthState;

/// Where unauthenticated or unauthorized visitors are sent.
pub const LOGIN_PATH: &str = "/login";

/// A storefront page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Products,
    ProductDetail(ProductId),
    Cart,
    Checkout,
    /// The confirmation page; the id is absent when it arrives via navigation state.
    OrderConfirmation(Option<OrderId>),
    Login,
    Signup,
    Dashboard,
    Admin,
    AdminPanel,
}

/// What a route demands of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Public,
    LoggedIn,
    Admin,
}

/// Outcome of guarding a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Render,
    Redirect(&'static str),
}

impl Route {
    #[must_use]
    pub const fn requirement(&self) -> Requirement {
        match self {
            Self::Home | Self::Products | Self::Login | Self::Signup => Requirement::Public,
            Self::ProductDetail(_)
            | Self::Cart
            | Self::Checkout
            | Self::OrderConfirmation(_)
            | Self::Dashboard => Requirement::LoggedIn,
            Self::Admin | Self::AdminPanel => Requirement::Admin,
        }
    }

    /// Parse a path such as `/products/cap-1`. Unknown paths yield `None`.
    #[must_use]
    pub fn parse(path: &str) -> Option<Self> {
        let trimmed = path.trim_end_matches('/');
        let mut segments = trimmed.trim_start_matches('/').splitn(2, '/');
        let head = segments.next().unwrap_or_default();
        let tail = segments.next().filter(|t| !t.is_empty() && !t.contains('/'));

        let route = match (head, tail) {
            ("", None) => Self::Home,
            ("products", None) => Self::Products,
            ("products", Some(id)) => Self::ProductDetail(ProductId::new(id)),
            ("cart", None) => Self::Cart,
            ("checkout", None) => Self::Checkout,
            ("order-confirmation", id) => Self::OrderConfirmation(id.map(OrderId::new)),
            ("login", None) => Self::Login,
            ("signup", None) => Self::Signup,
            ("dashboard", None) => Self::Dashboard,
            ("admin", None) => Self::Admin,
            ("admin-panel", None) => Self::AdminPanel,
            _ => return None,
        };
        Some(route)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Home => f.write_str("/"),
            Self::Products => f.write_str("/products"),
            Self::ProductDetail(id) => write!(f, "/products/{id}"),
            Self::Cart => f.write_str("/cart"),
            Self::Checkout => f.write_str("/checkout"),
            Self::OrderConfirmation(None) => f.write_str("/order-confirmation"),
            Self::OrderConfirmation(Some(id)) => write!(f, "/order-confirmation/{id}"),
            Self::Login => f.write_str(LOGIN_PATH),
            Self::Signup => f.write_str("/signup"),
            Self::Dashboard => f.write_str("/dashboard"),
            Self::Admin => f.write_str("/admin"),
            Self::AdminPanel => f.write_str("/admin-panel"),
        }
    }
}

/// Decide whether `session` may render `route`.
#[must_use]
pub fn guard(route: &Route, session: &AuthState) -> Access {
    let allowed = match route.requirement() {
        Requirement::Public => true,
        Requirement::LoggedIn => session.is_logged_in,
        Requirement::Admin => session.is_logged_in && session.role() == Some(Role::Admin),
    };

    if allowed {
        Access::Render
    } else {
        Access::Redirect(LOGIN_PATH)
    }
}

#[cfg(test)]
mod tests {
    use brimline_core::User;

    use super::*;

    fn session(role: Option<Role>) -> AuthState {
        AuthState {
            user: role.map(|role| User::new("u-1", "Kim", "kim@brimline.shop", role)),
            is_logged_in: role.is_some(),
        }
    }

    #[test]
    fn test_public_routes_always_render() {
        for route in [Route::Home, Route::Products, Route::Login, Route::Signup] {
            assert_eq!(guard(&route, &session(None)), Access::Render);
        }
    }

    #[test]
    fn test_logged_out_is_redirected() {
        let anonymous = session(None);
        for route in [
            Route::Cart,
            Route::Checkout,
            Route::Dashboard,
            Route::ProductDetail(ProductId::new("cap-1")),
            Route::OrderConfirmation(Some(OrderId::new("o-1"))),
            Route::Admin,
            Route::AdminPanel,
        ] {
            assert_eq!(guard(&route, &anonymous), Access::Redirect("/login"));
        }
    }

    #[test]
    fn test_admin_routes_need_admin_role() {
        let customer = session(Some(Role::User));
        assert_eq!(guard(&Route::Admin, &customer), Access::Redirect("/login"));
        assert_eq!(guard(&Route::AdminPanel, &customer), Access::Redirect("/login"));
        assert_eq!(guard(&Route::Dashboard, &customer), Access::Render);
        assert_eq!(guard(&Route::Cart, &customer), Access::Render);

        let admin = session(Some(Role::Admin));
        assert_eq!(guard(&Route::Admin, &admin), Access::Render);
    }

    #[test]
    fn test_stale_user_without_login_flag_is_redirected() {
        let mut stale = session(Some(Role::Admin));
        stale.is_logged_in = false;
        assert_eq!(guard(&Route::Admin, &stale), Access::Redirect("/login"));
    }

    #[test]
    fn test_parse_round_trips_display() {
        for route in [
            Route::Home,
            Route::Products,
            Route::ProductDetail(ProductId::new("snap-back-07")),
            Route::OrderConfirmation(Some(OrderId::new("o-1"))),
            Route::OrderConfirmation(None),
            Route::AdminPanel,
        ] {
            assert_eq!(Route::parse(&route.to_string()), Some(route));
        }
        assert_eq!(
            Route::parse("/products/cap-1"),
            Some(Route::ProductDetail(ProductId::new("cap-1")))
        );
        assert_eq!(Route::parse("/products/"), Some(Route::Products));
        assert_eq!(Route::parse("/product/cap-1"), None);
        assert_eq!(Route::parse("/order-confirmation"), Some(Route::OrderConfirmation(None)));
        assert_eq!(Route::parse("/nowhere"), None);
    }
}
