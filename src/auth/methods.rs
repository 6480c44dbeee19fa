//! # Authentication Methods
//!
//! Credential extractors tried by the authenticate stage. A method returns
//! `None` when its credential is absent or does not validate; only the
//! composite decides whether that is fatal.

use std::sync::Arc;

use tracing::debug;

use crate::pipeline::ApiRequest;

use super::identity::Identity;
use super::token::TokenValidator;

/// Default query parameter for token authentication
pub const DEFAULT_TOKEN_PARAM: &str = "access-token";

/// One way of establishing an identity from a request
pub trait AuthMethod: Send + Sync {
    /// Method name for logs
    fn name(&self) -> &'static str;

    /// Try to authenticate the request
    fn authenticate(&self, request: &ApiRequest) -> Option<Identity>;

    /// `WWW-Authenticate` challenge sent on failure, if any
    fn challenge(&self) -> Option<String> {
        None
    }
}

/// `Authorization: Bearer <token>`
pub struct BearerTokenAuth {
    validator: Arc<dyn TokenValidator>,
    realm: String,
}

impl BearerTokenAuth {
    pub fn new(validator: Arc<dyn TokenValidator>) -> Self {
        Self {
            validator,
            realm: "api".to_string(),
        }
    }

    /// Realm advertised in the challenge
    pub fn with_realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = realm.into();
        self
    }
}

impl AuthMethod for BearerTokenAuth {
    fn name(&self) -> &'static str {
        "bearer"
    }

    fn authenticate(&self, request: &ApiRequest) -> Option<Identity> {
        let header = request.header("authorization")?;
        let (scheme, token) = header.trim().split_once(char::is_whitespace)?;
        if !scheme.eq_ignore_ascii_case("bearer") {
            return None;
        }

        match self.validator.validate(token.trim()) {
            Ok(identity) => Some(identity),
            Err(e) => {
                debug!(method = self.name(), error = %e, "token rejected");
                None
            }
        }
    }

    fn challenge(&self) -> Option<String> {
        Some(format!("Bearer realm=\"{}\"", self.realm))
    }
}

/// `?access-token=<token>`
pub struct QueryParamTokenAuth {
    validator: Arc<dyn TokenValidator>,
    param: String,
}

impl QueryParamTokenAuth {
    pub fn new(validator: Arc<dyn TokenValidator>) -> Self {
        Self {
            validator,
            param: DEFAULT_TOKEN_PARAM.to_string(),
        }
    }

    /// Use a different query parameter name
    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.param = param.into();
        self
    }
}

impl AuthMethod for QueryParamTokenAuth {
    fn name(&self) -> &'static str {
        "query-param"
    }

    fn authenticate(&self, request: &ApiRequest) -> Option<Identity> {
        let token = request.query_param(&self.param)?;

        match self.validator.validate(token) {
            Ok(identity) => Some(identity),
            Err(e) => {
                debug!(method = self.name(), error = %e, "token rejected");
                None
            }
        }
    }
}

/// Ordered list of methods; the first one yielding an identity wins
#[derive(Default)]
pub struct CompositeAuth {
    methods: Vec<Arc<dyn AuthMethod>>,
}

impl CompositeAuth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, method: impl AuthMethod + 'static) -> Self {
        self.methods.push(Arc::new(method));
        self
    }

    /// Bearer header first, then query parameter, both against one validator
    pub fn token(validator: Arc<dyn TokenValidator>, query_param: &str) -> Self {
        Self::new()
            .with(BearerTokenAuth::new(Arc::clone(&validator)))
            .with(QueryParamTokenAuth::new(validator).with_param(query_param))
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

impl AuthMethod for CompositeAuth {
    fn name(&self) -> &'static str {
        "composite"
    }

    fn authenticate(&self, request: &ApiRequest) -> Option<Identity> {
        self.methods.iter().find_map(|m| m.authenticate(request))
    }

    fn challenge(&self) -> Option<String> {
        self.methods.iter().find_map(|m| m.challenge())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticTokenValidator;
    use axum::http::Method;

    fn validator() -> Arc<dyn TokenValidator> {
        Arc::new(
            StaticTokenValidator::new()
                .with_token("good", Identity::new("alice"))
                .with_token("other", Identity::new("bob")),
        )
    }

    #[test]
    fn test_bearer_header() {
        let auth = BearerTokenAuth::new(validator());

        let req = ApiRequest::new(Method::GET, "/").with_header("Authorization", "Bearer good");
        assert_eq!(auth.authenticate(&req).unwrap().id, "alice");

        let req = ApiRequest::new(Method::GET, "/").with_header("Authorization", "bearer  good");
        assert_eq!(auth.authenticate(&req).unwrap().id, "alice");

        let req = ApiRequest::new(Method::GET, "/").with_header("Authorization", "Basic good");
        assert!(auth.authenticate(&req).is_none());

        let req = ApiRequest::new(Method::GET, "/").with_header("Authorization", "Bearer bad");
        assert!(auth.authenticate(&req).is_none());
    }

    #[test]
    fn test_query_param() {
        let auth = QueryParamTokenAuth::new(validator());
        let req = ApiRequest::new(Method::GET, "/").with_query("access-token", "good");
        assert_eq!(auth.authenticate(&req).unwrap().id, "alice");

        let auth = QueryParamTokenAuth::new(validator()).with_param("token");
        assert!(auth.authenticate(&req).is_none());
    }

    #[test]
    fn test_composite_first_match_wins() {
        let auth = CompositeAuth::token(validator(), DEFAULT_TOKEN_PARAM);

        let req = ApiRequest::new(Method::GET, "/")
            .with_header("Authorization", "Bearer good")
            .with_query("access-token", "other");
        assert_eq!(auth.authenticate(&req).unwrap().id, "alice");

        // Invalid bearer falls through to the query parameter
        let req = ApiRequest::new(Method::GET, "/")
            .with_header("Authorization", "Bearer bad")
            .with_query("access-token", "other");
        assert_eq!(auth.authenticate(&req).unwrap().id, "bob");

        let req = ApiRequest::new(Method::GET, "/");
        assert!(auth.authenticate(&req).is_none());
        assert_eq!(auth.challenge(), Some("Bearer realm=\"api\"".to_string()));
    }
}
