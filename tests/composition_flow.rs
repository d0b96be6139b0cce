//! End-to-end composition tests against mock template and fragment backends.

use std::net::SocketAddr;
use std::time::Duration;

use composition_gateway::config::schema::{GatewayConfig, RouteConfig};
use composition_gateway::routing::route_match::RouteType;
use composition_gateway::HttpServer;

mod common;

fn route(name: &str, pattern: &str, backend: String, route_type: RouteType) -> RouteConfig {
    RouteConfig {
        name: name.into(),
        method: Some("GET".into()),
        path_pattern: pattern.into(),
        backend,
        route_type,
    }
}

async fn start_gateway(config: GatewayConfig, addr: SocketAddr) {
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    let server = HttpServer::new(config).unwrap();
    tokio::spawn(async move {
        let _ = server.run(listener).await;
    });
    tokio::time::sleep(Duration::from_millis(200)).await;
}

fn test_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

#[tokio::test]
async fn composes_template_with_fragment() {
    let template_addr: SocketAddr = "127.0.0.1:28481".parse().unwrap();
    let fragment_addr: SocketAddr = "127.0.0.1:28482".parse().unwrap();
    let gateway_addr: SocketAddr = "127.0.0.1:28483".parse().unwrap();

    common::start_mock_backend(
        template_addr,
        format!(
            "<html><body><fragment-include path=\"http://{}/news\">loading</fragment-include></body></html>",
            fragment_addr
        ),
    )
    .await;
    common::start_mock_backend(fragment_addr, "<p>headlines</p>".into()).await;

    let mut config = GatewayConfig::default();
    config.listener.bind_address = gateway_addr.to_string();
    config.routes.push(route(
        "home",
        "/",
        format!("http://{}/template", template_addr),
        RouteType::Template,
    ));
    start_gateway(config, gateway_addr).await;

    let res = test_client()
        .get(format!("http://{}/", gateway_addr))
        .send()
        .await
        .expect("gateway unreachable");

    assert_eq!(res.status(), 200);
    assert_eq!(
        res.headers().get("cache-control").unwrap(),
        "no-store,max-age=0"
    );
    let body = res.text().await.unwrap();
    assert_eq!(body, "<html><body><p>headlines</p></body></html>");
}

#[tokio::test]
async fn substitutes_fallback_when_fragment_backend_is_down() {
    let template_addr: SocketAddr = "127.0.0.1:28491".parse().unwrap();
    let gateway_addr: SocketAddr = "127.0.0.1:28493".parse().unwrap();

    // Nothing listens on 28492; the fetch fails with a connect error.
    common::start_mock_backend(
        template_addr,
        "<div><fragment-include path=\"http://127.0.0.1:28492/frag\">\
         <span>offline</span></fragment-include></div>"
            .into(),
    )
    .await;

    let mut config = GatewayConfig::default();
    config.listener.bind_address = gateway_addr.to_string();
    config.routes.push(route(
        "home",
        "/",
        format!("http://{}/template", template_addr),
        RouteType::Template,
    ));
    start_gateway(config, gateway_addr).await;

    let res = test_client()
        .get(format!("http://{}/", gateway_addr))
        .send()
        .await
        .expect("gateway unreachable");

    assert_eq!(res.status(), 200);
    let body = res.text().await.unwrap();
    assert_eq!(body, "<div><span>offline</span></div>");
}

#[tokio::test]
async fn unmatched_route_returns_404() {
    let gateway_addr: SocketAddr = "127.0.0.1:28501".parse().unwrap();

    let mut config = GatewayConfig::default();
    config.listener.bind_address = gateway_addr.to_string();
    config.routes.push(route(
        "home",
        "/",
        "http://127.0.0.1:1/template".into(),
        RouteType::Template,
    ));
    start_gateway(config, gateway_addr).await;

    let res = test_client()
        .get(format!("http://{}/missing", gateway_addr))
        .send()
        .await
        .expect("gateway unreachable");

    assert_eq!(res.status(), 404);
    assert_eq!(res.text().await.unwrap(), "no matching route");
}

#[tokio::test]
async fn proxy_route_passes_markup_through_unchanged() {
    let backend_addr: SocketAddr = "127.0.0.1:28511".parse().unwrap();
    let gateway_addr: SocketAddr = "127.0.0.1:28513".parse().unwrap();

    let raw = "<fragment-include path=\"http://127.0.0.1:1/x\">raw</fragment-include>";
    common::start_mock_backend(backend_addr, raw.into()).await;

    let mut config = GatewayConfig::default();
    config.listener.bind_address = gateway_addr.to_string();
    config.routes.push(route(
        "api",
        "/api/data",
        format!("http://{}/data", backend_addr),
        RouteType::Proxy,
    ));
    start_gateway(config, gateway_addr).await;

    let res = test_client()
        .get(format!("http://{}/api/data", gateway_addr))
        .send()
        .await
        .expect("gateway unreachable");

    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), raw, "markers stay untouched");
}

#[tokio::test]
async fn session_headers_round_trip_through_composition() {
    let template_addr: SocketAddr = "127.0.0.1:28521".parse().unwrap();
    let fragment_addr: SocketAddr = "127.0.0.1:28522".parse().unwrap();
    let gateway_addr: SocketAddr = "127.0.0.1:28523".parse().unwrap();

    common::start_mock_backend(
        template_addr,
        format!(
            "<main><fragment-include path=\"http://{}/cart\"></fragment-include></main>",
            fragment_addr
        ),
    )
    .await;
    common::start_backend(
        fragment_addr,
        200,
        vec![("x-session-cart".into(), "3".into())],
        "<ul>cart</ul>".into(),
    )
    .await;

    let mut config = GatewayConfig::default();
    config.listener.bind_address = gateway_addr.to_string();
    config.session.enabled = true;
    config.routes.push(route(
        "home",
        "/",
        format!("http://{}/template", template_addr),
        RouteType::Template,
    ));
    start_gateway(config, gateway_addr).await;

    let res = test_client()
        .get(format!("http://{}/", gateway_addr))
        .header("x-session-user", "alice")
        .send()
        .await
        .expect("gateway unreachable");

    assert_eq!(res.status(), 200);
    assert_eq!(res.headers().get("x-session-cart").unwrap(), "3");
    assert_eq!(res.headers().get("x-session-user").unwrap(), "alice");
    assert_eq!(
        res.text().await.unwrap(),
        "<main><ul>cart</ul></main>"
    );
}
