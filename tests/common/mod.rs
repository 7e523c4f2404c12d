//! Shared origin-site fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use gallery_grabber::models::Config;
use gallery_grabber::pipeline::PipelineContext;
use gallery_grabber::services::JobTracker;
use wiremock::matchers::{body_string, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const IMAGE_ONE: &[u8] = b"\xFF\xD8\xFFfirst-image";
pub const IMAGE_TWO: &[u8] = b"\x89PNGsecond-image";

/// Configuration pointing the site layout at the mock server, no pacing.
pub fn test_config(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.site.viewer_prefix = format!("{}/i/", server.uri());
    config.http.referer = format!("{}/", server.uri());
    config.pacing.min_delay_ms = 0;
    config.pacing.max_delay_ms = 0;
    config
}

pub fn test_context(server: &MockServer) -> PipelineContext {
    PipelineContext::new(Arc::new(test_config(server)), JobTracker::new()).unwrap()
}

pub fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8")
}

pub fn gallery_url(server: &MockServer) -> String {
    format!("{}/g/gallery", server.uri())
}

/// Gallery with two tooltip-wrapped viewer links, expected to be fetched
/// `times` times.
pub async fn mount_gallery(server: &MockServer, times: u64) {
    let uri = server.uri();
    let body = format!(
        r#"<html><body>
            <div class="tooltip"><a href="{uri}/i/one"><img src="{uri}/t/one.jpg"></a></div>
            <div class="tooltip"><a href="{uri}/i/two"><img src="{uri}/t/two.jpg"></a></div>
            <a href="/i/">all images</a>
        </body></html>"#
    );
    Mock::given(method("GET"))
        .and(path("/g/gallery"))
        .respond_with(html(body))
        .expect(times)
        .mount(server)
        .await;
}

/// Viewer `one` embeds the image; viewer `two` gates it behind a POST form.
pub async fn mount_viewers(server: &MockServer, times: u64) {
    let uri = server.uri();

    Mock::given(method("GET"))
        .and(path("/i/one"))
        .respond_with(html(
            r#"<img src="/t/one.jpg"><img class="centred" src="/img/one.jpg">"#.to_string(),
        ))
        .expect(times)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/i/two"))
        .respond_with(html(
            r#"<form method="POST" action="">
                 <input name="a" value="1">
                 <input name="b">
                 <input type="submit" value="Continue to image">
               </form>"#
                .to_string(),
        ))
        .expect(times)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/i/two"))
        .and(body_string("a=1&b="))
        .respond_with(html(format!(
            r#"<img src="{uri}/i/thumb"><img id="image" src="{uri}/img/two.png">"#
        )))
        .expect(times)
        .mount(server)
        .await;
}

pub async fn mount_images(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/img/one.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(IMAGE_ONE, "image/jpeg"))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/img/two.png"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(IMAGE_TWO, "image/png"))
        .mount(server)
        .await;
}

/// Gallery of plain viewer links named `names`, each viewer answering after
/// `delay` with a centred image at `/img/<name>.jpg`.
pub async fn mount_slow_gallery(server: &MockServer, names: &[&str], delay: Duration) {
    let uri = server.uri();
    let gallery: String = names
        .iter()
        .map(|name| format!(r#"<a href="/i/{name}">{name}</a>"#))
        .collect();
    Mock::given(method("GET"))
        .and(path("/g/gallery"))
        .respond_with(html(gallery))
        .mount(server)
        .await;

    for name in names {
        Mock::given(method("GET"))
            .and(path(format!("/i/{name}")))
            .respond_with(
                html(format!(r#"<img class="centred" src="{uri}/img/{name}.jpg">"#))
                    .set_delay(delay),
            )
            .mount(server)
            .await;
    }
}

/// Paths of the viewer pages the mock server has seen, in arrival order.
pub async fn viewer_requests(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|request| request.url.path().to_string())
        .filter(|path| path.starts_with("/i/"))
        .collect()
}
