//! View route table
//!
//! Maps URL paths to named views and derives the page title on navigation

use crate::config::settings::{DEFAULT_ROUTE, TITLE_TEMPLATE};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// A named view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    /// Path pattern; `:name` segments capture a parameter
    pub path: &'static str,
    pub name: &'static str,
    pub title: Option<&'static str>,
}

/// Result of resolving a concrete path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteMatch {
    pub route: Route,
    /// Path after redirects
    pub path: String,
    pub params: BTreeMap<String, String>,
}

impl RouteMatch {
    /// Page title, when the route has one
    pub fn page_title(&self) -> Option<String> {
        self.route.title.map(page_title)
    }
}

/// Format a page title from a route title
pub fn page_title(title: &str) -> String {
    TITLE_TEMPLATE.replace("{title}", title)
}

/// Route table with redirects
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
    redirects: Vec<(&'static str, &'static str)>,
}

static DEFAULT_TABLE: Lazy<RouteTable> = Lazy::new(|| RouteTable {
    routes: vec![
        Route {
            path: "/dashboard",
            name: "Dashboard",
            title: Some("Dashboard"),
        },
        Route {
            path: "/strategies",
            name: "StrategyList",
            title: Some("Strategy Management"),
        },
        Route {
            path: "/strategies/:id",
            name: "StrategyDetail",
            title: Some("Strategy Detail"),
        },
        Route {
            path: "/user-audit",
            name: "UserAudit",
            title: Some("User Audit"),
        },
        Route {
            path: "/settings",
            name: "Settings",
            title: Some("Settings"),
        },
    ],
    redirects: vec![("/", DEFAULT_ROUTE)],
});

impl Default for RouteTable {
    fn default() -> Self {
        DEFAULT_TABLE.clone()
    }
}

impl RouteTable {
    /// All routes in declaration order
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Look a route up by name
    pub fn by_name(&self, name: &str) -> Option<&Route> {
        self.routes.iter().find(|route| route.name == name)
    }

    /// Resolve a concrete path, following redirects
    ///
    /// Query strings and fragments are ignored; a trailing `/` is not significant.
    pub fn resolve(&self, path: &str) -> Option<RouteMatch> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let mut path = normalize(path);

        // Bounded so a redirect cycle cannot loop forever
        for _ in 0..=self.redirects.len() {
            match self.redirects.iter().find(|(from, _)| *from == path) {
                Some((_, to)) => {
                    debug!("Redirecting {} to {}", path, to);
                    path = (*to).to_string();
                }
                None => break,
            }
        }

        self.routes.iter().find_map(|route| {
            match_pattern(route.path, &path).map(|params| RouteMatch {
                route: route.clone(),
                path: path.clone(),
                params,
            })
        })
    }
}

fn normalize(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

fn match_pattern(pattern: &str, path: &str) -> Option<BTreeMap<String, String>> {
    let pattern_segments: Vec<&str> = pattern.split('/').collect();
    let path_segments: Vec<&str> = path.split('/').collect();
    if pattern_segments.len() != path_segments.len() {
        return None;
    }

    let mut params = BTreeMap::new();
    for (expected, actual) in pattern_segments.iter().zip(&path_segments) {
        match expected.strip_prefix(':') {
            Some(name) if !actual.is_empty() => {
                params.insert(name.to_string(), (*actual).to_string());
            }
            Some(_) => return None,
            None if expected == actual => {}
            None => return None,
        }
    }
    Some(params)
}
