//! GraphQL documents for the authentication flow.

use serde_json::json;

use crate::entities::{GraphqlRequest, LoginCredentials};

pub const LOGIN_MUTATION: &str = r#"
mutation Login($email: String!, $password: String!) {
  login(email: $email, password: $password) {
    access_token
    refresh_token
  }
}
"#;

pub const REFRESH_TOKEN_MUTATION: &str = r#"
mutation RefreshToken($refresh_token: String!) {
  refreshToken(refresh_token: $refresh_token) {
    access_token
    refresh_token
  }
}
"#;

pub const LOGOUT_MUTATION: &str = r#"
mutation Logout {
  logout
}
"#;

pub const ME_QUERY: &str = r#"
query Me {
  me {
    uuid
    first_name
    last_name
    email
    language
    password_changed_at
    is_expired_verification_code
    avatar
    currency
    customer { uuid }
    passenger { uuid }
    current_membership { uuid name }
    payment_provider
    measurement_system
    temperature_system
    date_format
    time_format
    phone
    phone_country
    created_at
    roles { name }
  }
}
"#;

pub fn login(credentials: &LoginCredentials) -> GraphqlRequest {
    GraphqlRequest::new(LOGIN_MUTATION).with_variables(json!({
        "email": credentials.email,
        "password": credentials.password,
    }))
}

pub fn refresh_token(refresh_token: &str) -> GraphqlRequest {
    GraphqlRequest::new(REFRESH_TOKEN_MUTATION)
        .with_variables(json!({ "refresh_token": refresh_token }))
}

pub fn logout() -> GraphqlRequest {
    GraphqlRequest::new(LOGOUT_MUTATION)
}

pub fn me() -> GraphqlRequest {
    GraphqlRequest::new(ME_QUERY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_names() {
        let credentials = LoginCredentials::new("a@b.c".to_string(), "pw".to_string());

        assert_eq!(login(&credentials).display_name(), "Login");
        assert_eq!(refresh_token("r").display_name(), "RefreshToken");
        assert_eq!(logout().display_name(), "Logout");
        assert_eq!(me().display_name(), "Me");
        assert!(logout().is_mutation());
        assert!(!me().is_mutation());
    }

    #[test]
    fn test_refresh_variables() {
        let request = refresh_token("R1");
        assert_eq!(request.variables["refresh_token"], "R1");
    }
}
