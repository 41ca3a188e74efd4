//! End-to-end tests for the plain-HTTP forwarding path.

use std::time::Duration;

use forward_proxy::config::ProxyConfig;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

mod common;

#[tokio::test]
async fn forward_get_mirrors_origin_and_strips_hop_by_hop() {
    let (origin_addr, mut requests) = common::start_capturing_origin("hello").await;
    let (proxy_addr, shutdown) = common::spawn_proxy(ProxyConfig::default()).await;

    let client = reqwest::Client::builder()
        .proxy(reqwest::Proxy::http(format!("http://{proxy_addr}")).unwrap())
        .build()
        .unwrap();

    let res = client
        .get(format!("http://{origin_addr}/foo?x=1"))
        .header("x-custom", "abc")
        .header("proxy-connection", "keep-alive")
        .send()
        .await
        .expect("proxy unreachable");

    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "hello");

    let head = tokio::time::timeout(Duration::from_secs(2), requests.recv())
        .await
        .expect("origin saw no request")
        .unwrap();
    let head_lower = head.to_lowercase();

    assert!(
        head.starts_with("GET /foo?x=1 HTTP/1.1"),
        "origin got: {head}"
    );
    assert!(head_lower.contains("x-custom: abc"));
    assert!(
        !head_lower.contains("proxy-connection"),
        "hop-by-hop header reached the origin: {head}"
    );

    shutdown.trigger();
}

#[tokio::test]
async fn forward_duplicate_headers_reach_origin_in_order() {
    let (origin_addr, mut requests) = common::start_capturing_origin("ok").await;
    let (proxy_addr, shutdown) = common::spawn_proxy(ProxyConfig::default()).await;

    let client = reqwest::Client::builder()
        .proxy(reqwest::Proxy::http(format!("http://{proxy_addr}")).unwrap())
        .build()
        .unwrap();

    let res = client
        .get(format!("http://{origin_addr}/"))
        .header("x-trace", "one")
        .header("x-trace", "two")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let head = requests.recv().await.unwrap().to_lowercase();
    let first = head.find("x-trace: one").expect("first duplicate missing");
    let second = head.find("x-trace: two").expect("second duplicate missing");
    assert!(first < second, "duplicates reordered: {head}");

    shutdown.trigger();
}

#[tokio::test]
async fn forward_unreachable_destination_is_502() {
    let dead_addr = common::unreachable_addr().await;
    let (proxy_addr, shutdown) = common::spawn_proxy(ProxyConfig::default()).await;

    let client = reqwest::Client::builder()
        .proxy(reqwest::Proxy::http(format!("http://{proxy_addr}")).unwrap())
        .build()
        .unwrap();

    let res = client
        .get(format!("http://{dead_addr}/"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 502);
    assert_eq!(res.text().await.unwrap(), "Bad Gateway\n");

    shutdown.trigger();
}

#[tokio::test]
async fn forward_origin_form_target_is_400() {
    let (proxy_addr, shutdown) = common::spawn_proxy(ProxyConfig::default()).await;

    // Origin-form request target: a forward proxy needs an absolute URI.
    let mut stream = TcpStream::connect(proxy_addr).await.unwrap();
    stream
        .write_all(b"GET /foo HTTP/1.1\r\nHost: example.com\r\n\r\n")
        .await
        .unwrap();

    let head = common::read_head(&mut stream).await;
    assert!(head.starts_with("HTTP/1.1 400"), "got: {head}");

    shutdown.trigger();
}
