//! Page access rules based on whether an access token is present.

use url::form_urlencoded;

use crate::config::{RouteSettings, HOME_ROUTE, LOGIN_ROUTE};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Proceed,
    Redirect(String),
}

pub struct RouteGuard {
    protected: Vec<String>,
    guest_only: Vec<String>,
    login_route: String,
    home_route: String,
}

impl RouteGuard {
    pub fn new(routes: &RouteSettings) -> Self {
        Self {
            protected: routes.protected.clone(),
            guest_only: routes.guest_only.clone(),
            login_route: LOGIN_ROUTE.to_string(),
            home_route: HOME_ROUTE.to_string(),
        }
    }

    pub fn with_targets(mut self, login_route: &str, home_route: &str) -> Self {
        self.login_route = login_route.to_string();
        self.home_route = home_route.to_string();
        self
    }

    /// Decide where a visit to `path` ends up.
    ///
    /// Only token presence matters here; an expired token still counts as
    /// signed in until the pipeline finds out otherwise.
    pub fn check(&self, path: &str, has_token: bool) -> RouteDecision {
        let matches = |prefixes: &[String]| prefixes.iter().any(|p| path.starts_with(p.as_str()));

        if !has_token && matches(&self.protected) {
            let query: String = form_urlencoded::Serializer::new(String::new())
                .append_pair("redirect", path)
                .finish();
            return RouteDecision::Redirect(format!("{}?{}", self.login_route, query));
        }

        if has_token && matches(&self.guest_only) {
            return RouteDecision::Redirect(self.home_route.clone());
        }

        RouteDecision::Proceed
    }
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::new(&RouteSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/account", false, RouteDecision::Redirect("/login?redirect=%2Faccount".into()))]
    #[case("/account/settings", false, RouteDecision::Redirect("/login?redirect=%2Faccount%2Fsettings".into()))]
    #[case("/nft-wallet", false, RouteDecision::Redirect("/login?redirect=%2Fnft-wallet".into()))]
    #[case("/account", true, RouteDecision::Proceed)]
    #[case("/login", true, RouteDecision::Redirect("/".into()))]
    #[case("/register", true, RouteDecision::Redirect("/".into()))]
    #[case("/login", false, RouteDecision::Proceed)]
    #[case("/tours", false, RouteDecision::Proceed)]
    #[case("/tours", true, RouteDecision::Proceed)]
    fn test_default_rules(
        #[case] path: &str,
        #[case] has_token: bool,
        #[case] expected: RouteDecision,
    ) {
        assert_eq!(RouteGuard::default().check(path, has_token), expected);
    }

    #[test]
    fn test_custom_targets() {
        let guard = RouteGuard::new(&RouteSettings {
            protected: vec!["/vip".to_string()],
            guest_only: vec!["/signup".to_string()],
        })
        .with_targets("/auth", "/home");

        assert_eq!(
            guard.check("/vip", false),
            RouteDecision::Redirect("/auth?redirect=%2Fvip".to_string())
        );
        assert_eq!(guard.check("/signup", true), RouteDecision::Redirect("/home".to_string()));
        assert_eq!(guard.check("/account", false), RouteDecision::Proceed);
    }
}
