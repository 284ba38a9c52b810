//! End-to-end routing between the root directory and upstream hosts.

use std::fs;

use mixed_server::config::RoutingPolicy;

mod common;

fn site() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("index.html"), "<h1>home</h1>").unwrap();
    fs::create_dir(dir.path().join("assets")).unwrap();
    fs::write(dir.path().join("assets/app.js"), "console.log(1)").unwrap();
    dir
}

#[tokio::test]
async fn test_local_file_is_served() {
    let dir = site();
    let (addr, shutdown) = common::start_server(common::proxy_config(dir.path())).await;

    let res = common::client()
        .get(format!("http://{addr}/assets/app.js"))
        .send()
        .await
        .expect("server unreachable");

    assert_eq!(res.status(), 200);
    assert!(res.headers().get("access-control-allow-origin").is_none());
    assert!(res.headers().get("x-request-id").is_some());
    assert_eq!(res.text().await.unwrap(), "console.log(1)");

    shutdown.trigger();
}

#[tokio::test]
async fn test_directory_serves_index() {
    let dir = site();
    let (addr, shutdown) = common::start_server(common::proxy_config(dir.path())).await;

    let res = common::client().get(format!("http://{addr}/")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "<h1>home</h1>");

    shutdown.trigger();
}

#[tokio::test]
async fn test_index_html_wins_over_host_shaped_path() {
    // "index.html" is also a valid hostname; the existing file must win.
    let dir = site();
    let (addr, shutdown) = common::start_server(common::proxy_config(dir.path())).await;

    let res = common::client()
        .get(format!("http://{addr}/index.html"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "<h1>home</h1>");

    shutdown.trigger();
}

#[tokio::test]
async fn test_invalid_host_segment_is_plain_404() {
    // No dedicated error for a bad host: it is just a missing local file.
    let dir = site();
    let (addr, shutdown) = common::start_server(common::proxy_config(dir.path())).await;

    for path in ["/not_a_host!/a", "/a.123/x", "/localhost/x"] {
        let res = common::client()
            .get(format!("http://{addr}{path}"))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 404, "{path}");
        assert!(res.headers().get("access-control-allow-origin").is_none(), "{path}");
    }

    shutdown.trigger();
}

#[tokio::test]
async fn test_proxy_disabled_never_forwards() {
    let dir = site();
    let upstream = common::start_echo_upstream().await;
    let mut config = common::proxy_config(dir.path());
    config.proxy.enabled = false;
    config.proxy.policy = RoutingPolicy::HeaderFirst;
    let (addr, shutdown) = common::start_server(config).await;

    let res = common::client()
        .get(format!("http://{addr}/acme.example/widgets"))
        .header("x-forwarded-host", upstream.to_string())
        .header("x-forwarded-proto", "http")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);

    shutdown.trigger();
}

#[tokio::test]
async fn test_header_first_forwards_with_cors() {
    let dir = site();
    let upstream = common::start_echo_upstream().await;
    let mut config = common::proxy_config(dir.path());
    config.proxy.policy = RoutingPolicy::HeaderFirst;
    let (addr, shutdown) = common::start_server(config).await;

    let res = common::client()
        .get(format!("http://{addr}/widgets?page=2"))
        .header("x-forwarded-host", upstream.to_string())
        .header("x-forwarded-proto", "http")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    let headers = res.headers().clone();
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert_eq!(
        headers["access-control-allow-methods"],
        "POST, GET, OPTIONS, PUT, DELETE, HEAD, PATCH"
    );
    assert_eq!(
        headers["access-control-allow-headers"],
        "Content-Type, Content-Length, Accept-Encoding, X-CSRF-Token, Authorization"
    );
    assert_eq!(headers["access-control-allow-credentials"], "true");
    assert_eq!(
        res.text().await.unwrap(),
        format!("GET /widgets?page=2 host={upstream}")
    );

    shutdown.trigger();
}

#[tokio::test]
async fn test_header_first_port_hint() {
    let dir = site();
    let upstream = common::start_echo_upstream().await;
    let mut config = common::proxy_config(dir.path());
    config.proxy.policy = RoutingPolicy::HeaderFirst;
    let (addr, shutdown) = common::start_server(config).await;

    let res = common::client()
        .post(format!("http://{addr}/submit"))
        .header("x-forwarded-host", "127.0.0.1")
        .header("x-forwarded-port", upstream.port().to_string())
        .header("x-forwarded-scheme", "http")
        .body("payload")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(
        res.text().await.unwrap(),
        format!("POST /submit host=127.0.0.1:{}", upstream.port())
    );

    shutdown.trigger();
}

#[tokio::test]
async fn test_path_first_ignores_forwarded_host() {
    let dir = site();
    let upstream = common::start_echo_upstream().await;
    let (addr, shutdown) = common::start_server(common::proxy_config(dir.path())).await;

    let res = common::client()
        .get(format!("http://{addr}/index.html"))
        .header("x-forwarded-host", upstream.to_string())
        .header("x-forwarded-proto", "http")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "<h1>home</h1>");

    shutdown.trigger();
}

#[tokio::test]
async fn test_unreachable_upstream_is_bad_gateway() {
    let dir = site();
    let dead = common::closed_port().await;
    let mut config = common::proxy_config(dir.path());
    config.proxy.policy = RoutingPolicy::HeaderFirst;
    let (addr, shutdown) = common::start_server(config).await;

    let res = common::client()
        .get(format!("http://{addr}/anything"))
        .header("x-forwarded-host", dead.to_string())
        .header("x-forwarded-proto", "http")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 502);

    shutdown.trigger();
}

#[tokio::test]
async fn test_unsupported_forwarded_scheme_is_bad_request() {
    let dir = site();
    let upstream = common::start_echo_upstream().await;
    let mut config = common::proxy_config(dir.path());
    config.proxy.policy = RoutingPolicy::HeaderFirst;
    let (addr, shutdown) = common::start_server(config).await;

    let res = common::client()
        .get(format!("http://{addr}/x"))
        .header("x-forwarded-host", upstream.to_string())
        .header("x-forwarded-proto", "ftp")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);

    shutdown.trigger();
}

#[tokio::test]
async fn test_directory_without_index_is_listed() {
    let dir = site();
    fs::create_dir(dir.path().join("docs")).unwrap();
    fs::write(dir.path().join("docs/readme.txt"), "read me").unwrap();
    let mut config = common::proxy_config(dir.path());
    config.proxy.enabled = false;
    let (addr, shutdown) = common::start_server(config).await;

    let res = common::client()
        .get(format!("http://{addr}/docs/"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["content-type"], "text/html; charset=utf-8");
    let body = res.text().await.unwrap();
    assert!(body.contains("<a href=\"./readme.txt\">readme.txt</a>"), "{body}");

    shutdown.trigger();
}

#[tokio::test]
async fn test_host_shaped_directory_is_listed_not_forwarded() {
    let dir = site();
    fs::create_dir(dir.path().join("acme.example")).unwrap();
    fs::write(dir.path().join("acme.example/notes.txt"), "n").unwrap();
    let (addr, shutdown) = common::start_server(common::proxy_config(dir.path())).await;

    let res = common::client()
        .get(format!("http://{addr}/acme.example/"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert!(res.headers().get("access-control-allow-origin").is_none());
    assert!(res.text().await.unwrap().contains("./notes.txt"));

    shutdown.trigger();
}

#[tokio::test]
async fn test_path_first_forwards_leading_host() {
    let dir = site();
    let upstream = common::start_echo_upstream().await;
    let mut config = common::proxy_config(dir.path());
    config.proxy.default_scheme = "http".into();
    config
        .proxy
        .host_mappings
        .insert("acme.test".into(), upstream.ip());
    let (addr, shutdown) = common::start_server(config).await;

    let res = common::client()
        .get(format!(
            "http://{addr}/acme.test:{}/widgets?page=2",
            upstream.port()
        ))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["access-control-allow-origin"], "*");
    assert_eq!(res.headers()["access-control-allow-credentials"], "true");
    assert_eq!(
        res.text().await.unwrap(),
        format!("GET /widgets?page=2 host=acme.test:{}", upstream.port())
    );

    shutdown.trigger();
}
