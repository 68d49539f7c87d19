//! Hypermedia links and named-route URL resolution.

use std::collections::HashMap;

use axum::http::Method;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A follow-up action available on a returned resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
    pub rel: String,
    pub method: String,
}

impl Link {
    pub fn new(href: impl Into<String>, rel: impl Into<String>, method: &Method) -> Self {
        Self {
            href: href.into(),
            rel: rel.into(),
            method: method.as_str().to_string(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("no route named '{0}'")]
    UnknownRoute(String),

    #[error("route '{route}' requires parameter '{param}'")]
    MissingParameter { route: String, param: String },

    #[error("route '{0}' has an unterminated parameter")]
    MalformedTemplate(String),
}

/// Resolves a named route and its parameters into an absolute URL.
pub trait UrlBuilder: Send + Sync {
    fn link(&self, route: &str, params: &[(&str, String)]) -> Result<String, RouteError>;
}

/// Route templates registered by name under one public base URL.
///
/// Templates use the same `{param}` syntax as the axum router, so a module can
/// register the exact strings it routes on.
#[derive(Debug, Clone)]
pub struct RouteTable {
    base: String,
    routes: HashMap<&'static str, &'static str>,
}

impl RouteTable {
    /// `public_url` is the scheme and authority, `mount_path` the prefix the
    /// module's router is nested under.
    pub fn new(public_url: &str, mount_path: &str) -> Self {
        Self {
            base: format!("{}{}", public_url.trim_end_matches('/'), mount_path),
            routes: HashMap::new(),
        }
    }

    pub fn with_route(mut self, name: &'static str, template: &'static str) -> Self {
        self.routes.insert(name, template);
        self
    }
}

impl UrlBuilder for RouteTable {
    fn link(&self, route: &str, params: &[(&str, String)]) -> Result<String, RouteError> {
        let template = self
            .routes
            .get(route)
            .ok_or_else(|| RouteError::UnknownRoute(route.to_string()))?;

        let mut url = self.base.clone();
        let mut rest: &str = template;
        while let Some(open) = rest.find('{') {
            url.push_str(&rest[..open]);
            let close = rest[open..]
                .find('}')
                .ok_or_else(|| RouteError::MalformedTemplate(route.to_string()))?;
            let name = &rest[open + 1..open + close];
            let value = params
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value)
                .ok_or_else(|| RouteError::MissingParameter {
                    route: route.to_string(),
                    param: name.to_string(),
                })?;
            url.push_str(value);
            rest = &rest[open + close + 1..];
        }
        url.push_str(rest);

        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RouteTable {
        RouteTable::new("http://localhost:8080/", "/api/authors")
            .with_route("list", "/{author_id}/books")
            .with_route("single", "/{author_id}/books/{book_id}")
            .with_route("broken", "/{author_id/books")
    }

    #[test]
    fn resolves_every_parameter() {
        let url = table()
            .link(
                "single",
                &[("author_id", "a1".to_string()), ("book_id", "b2".to_string())],
            )
            .unwrap();
        assert_eq!(url, "http://localhost:8080/api/authors/a1/books/b2");
    }

    #[test]
    fn extra_parameters_are_ignored() {
        let url = table()
            .link(
                "list",
                &[("author_id", "a1".to_string()), ("book_id", "b2".to_string())],
            )
            .unwrap();
        assert_eq!(url, "http://localhost:8080/api/authors/a1/books");
    }

    #[test]
    fn missing_parameter_is_an_error() {
        let err = table()
            .link("single", &[("author_id", "a1".to_string())])
            .unwrap_err();
        assert_eq!(
            err,
            RouteError::MissingParameter {
                route: "single".to_string(),
                param: "book_id".to_string(),
            }
        );
    }

    #[test]
    fn unknown_route_and_bad_template_are_errors() {
        assert_eq!(
            table().link("nope", &[]).unwrap_err(),
            RouteError::UnknownRoute("nope".to_string())
        );
        assert_eq!(
            table()
                .link("broken", &[("author_id", "a1".to_string())])
                .unwrap_err(),
            RouteError::MalformedTemplate("broken".to_string())
        );
    }

    #[test]
    fn link_carries_method_name() {
        let link = Link::new("http://x/1", "delete_book", &Method::DELETE);
        assert_eq!(link.method, "DELETE");
        assert_eq!(link.rel, "delete_book");
    }
}
