//! View route table tests

use quota_manager::routes::page_title;
use quota_manager::RouteTable;

#[test]
fn test_root_redirects_to_dashboard() {
    let table = RouteTable::default();
    let matched = table.resolve("/").unwrap();

    assert_eq!(matched.route.name, "Dashboard");
    assert_eq!(matched.path, "/dashboard");
    assert_eq!(matched.page_title(), Some("Dashboard - Quota Manager".to_string()));
}

#[test]
fn test_strategy_detail_captures_id() {
    let table = RouteTable::default();
    let matched = table.resolve("/strategies/7").unwrap();

    assert_eq!(matched.route.name, "StrategyDetail");
    assert_eq!(matched.params.get("id").map(String::as_str), Some("7"));
    assert_eq!(
        matched.page_title(),
        Some("Strategy Detail - Quota Manager".to_string())
    );
}

#[test]
fn test_static_routes() {
    let table = RouteTable::default();
    let cases = [
        ("/dashboard", "Dashboard", "Dashboard"),
        ("/strategies", "StrategyList", "Strategy Management"),
        ("/user-audit", "UserAudit", "User Audit"),
        ("/settings", "Settings", "Settings"),
    ];

    for (path, name, title) in cases {
        let matched = table.resolve(path).unwrap();
        assert_eq!(matched.route.name, name);
        assert_eq!(matched.route.title, Some(title));
        assert!(matched.params.is_empty());
    }
}

#[test]
fn test_query_and_trailing_slash_ignored() {
    let table = RouteTable::default();

    let matched = table.resolve("/strategies/?page=2").unwrap();
    assert_eq!(matched.route.name, "StrategyList");

    let matched = table.resolve("/strategies/abc#history").unwrap();
    assert_eq!(matched.params.get("id").map(String::as_str), Some("abc"));
}

#[test]
fn test_unknown_path() {
    let table = RouteTable::default();
    assert!(table.resolve("/reports").is_none());
    assert!(table.resolve("/strategies/7/executions").is_none());
}

#[test]
fn test_lookup_by_name() {
    let table = RouteTable::default();
    assert_eq!(table.routes().len(), 5);
    assert_eq!(table.by_name("UserAudit").map(|r| r.path), Some("/user-audit"));
    assert!(table.by_name("Login").is_none());
}

#[test]
fn test_page_title_template() {
    assert_eq!(page_title("Settings"), "Settings - Quota Manager");
}
