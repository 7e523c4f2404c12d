mod common;

use std::io::{Cursor, Read};

use gallery_grabber::error::AppError;
use gallery_grabber::models::JobStatus;
use gallery_grabber::pipeline::{run_archive, run_discovery};
use gallery_grabber::services::ArchiveAssembler;
use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{
    IMAGE_ONE, IMAGE_TWO, gallery_url, html, mount_gallery, mount_images, mount_viewers,
    test_config, test_context,
};

fn read_entries(bytes: Vec<u8>) -> Vec<(String, Vec<u8>)> {
    let mut zip = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    (0..zip.len())
        .map(|i| {
            let mut file = zip.by_index(i).unwrap();
            let mut data = Vec::new();
            file.read_to_end(&mut data).unwrap();
            (file.name().to_string(), data)
        })
        .collect()
}

#[tokio::test]
async fn failed_download_leaves_a_gap() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/u1.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"one".to_vec()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/u2.jpg"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/u3.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"three".to_vec()))
        .mount(&server)
        .await;

    let config = test_config(&server);
    let assembler = ArchiveAssembler::new(reqwest::Client::new(), &config.http);
    let uri = server.uri();
    let urls = vec![
        format!("{uri}/u1.jpg"),
        format!("{uri}/u2.jpg"),
        format!("{uri}/u3.png"),
    ];

    let archive = assembler.build(&urls).await.unwrap();

    assert_eq!(archive.entries(), ["image_1.jpg", "image_3.png"]);
    assert_eq!(archive.failed(), [format!("{uri}/u2.jpg")]);
    assert_eq!(
        read_entries(archive.into_bytes()),
        vec![
            ("image_1.jpg".to_string(), b"one".to_vec()),
            ("image_3.png".to_string(), b"three".to_vec()),
        ]
    );
}

#[tokio::test]
async fn unreachable_host_is_skipped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ok.gif"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"gif".to_vec()))
        .mount(&server)
        .await;
    let config = test_config(&server);
    let assembler = ArchiveAssembler::new(reqwest::Client::new(), &config.http);
    let urls = vec![
        "http://127.0.0.1:1/nothing-listens-here.jpg".to_string(),
        format!("{}/ok.gif", server.uri()),
    ];

    let archive = assembler.build(&urls).await.unwrap();

    assert_eq!(archive.entries(), ["image_2.gif"]);
    assert_eq!(archive.failed().len(), 1);
}

#[tokio::test]
async fn cached_job_skips_rediscovery() {
    let server = MockServer::start().await;
    // Gallery and viewers may only be fetched by the first discovery.
    mount_gallery(&server, 1).await;
    mount_viewers(&server, 1).await;
    mount_images(&server).await;
    let ctx = test_context(&server);

    let discovery = run_discovery(&ctx, &gallery_url(&server), None).await.unwrap();
    let archive = run_archive(&ctx, &gallery_url(&server), Some(&discovery.job_id), None)
        .await
        .unwrap();

    assert_eq!(
        read_entries(archive.into_bytes()),
        vec![
            ("image_1.jpg".to_string(), IMAGE_ONE.to_vec()),
            ("image_2.png".to_string(), IMAGE_TWO.to_vec()),
        ]
    );
}

#[tokio::test]
async fn missing_job_falls_back_to_fresh_discovery() {
    let server = MockServer::start().await;
    mount_gallery(&server, 1).await;
    mount_viewers(&server, 1).await;
    mount_images(&server).await;
    let ctx = test_context(&server);

    let archive = run_archive(&ctx, &gallery_url(&server), Some("no-such-job"), None)
        .await
        .unwrap();

    assert_eq!(archive.entries(), ["image_1.jpg", "image_2.png"]);
    assert_eq!(ctx.jobs.len().await, 1);
}

#[tokio::test]
async fn empty_cached_job_is_rediscovered() {
    let server = MockServer::start().await;
    mount_gallery(&server, 1).await;
    mount_viewers(&server, 1).await;
    mount_images(&server).await;
    let ctx = test_context(&server);

    let stale = ctx.jobs.create(&gallery_url(&server)).await;
    ctx.jobs.mark_completed(&stale).await.unwrap();
    assert_eq!(ctx.jobs.get(&stale).await.unwrap().status, JobStatus::Completed);

    let archive = run_archive(&ctx, &gallery_url(&server), Some(&stale), None)
        .await
        .unwrap();

    assert_eq!(archive.entries().len(), 2);
}

#[tokio::test]
async fn gallery_without_images_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/g/gallery"))
        .respond_with(html(r#"<a href="/i/dead">dead</a>"#.to_string()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/i/dead"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let ctx = test_context(&server);

    let result = run_archive(&ctx, &gallery_url(&server), None, None).await;

    assert!(matches!(result, Err(AppError::NoImagesToDownload)));
}

#[tokio::test]
async fn limit_applies_to_cached_urls() {
    let server = MockServer::start().await;
    mount_gallery(&server, 1).await;
    mount_viewers(&server, 1).await;
    mount_images(&server).await;
    let ctx = test_context(&server);

    let discovery = run_discovery(&ctx, &gallery_url(&server), None).await.unwrap();
    let archive = run_archive(&ctx, &gallery_url(&server), Some(&discovery.job_id), Some(1))
        .await
        .unwrap();

    assert_eq!(archive.entries(), ["image_1.jpg"]);
}
