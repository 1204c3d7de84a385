use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use esg_report::fetch::HttpFetcher;
use esg_report::{
    AssemblerConfig, FetchError, ImageSource, ReportAssembler, ReportError, ReportSpec,
};
use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};
use lopdf::Document;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Answers `GET <path>` with 200 and the registered body, anything else with 404.
async fn serve(routes: HashMap<&'static str, Vec<u8>>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind listener");
    let addr = listener.local_addr().expect("listener address");
    let routes = Arc::new(routes);

    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                return;
            };
            let routes = Arc::clone(&routes);
            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut chunk = [0u8; 1024];
                while !request.windows(4).any(|window| window == b"\r\n\r\n") {
                    match stream.read(&mut chunk).await {
                        Ok(0) | Err(_) => return,
                        Ok(read) => request.extend_from_slice(&chunk[..read]),
                    }
                }

                let head = String::from_utf8_lossy(&request);
                let path = head.split_whitespace().nth(1).unwrap_or("/");
                let (status, body) = match routes.get(path) {
                    Some(body) => ("200 OK", body.clone()),
                    None => ("404 Not Found", Vec::new()),
                };

                let header = format!(
                    "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    body.len()
                );
                let _ = stream.write_all(header.as_bytes()).await;
                let _ = stream.write_all(&body).await;
                let _ = stream.shutdown().await;
            });
        }
    });

    addr
}

fn jpeg() -> Vec<u8> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(RgbImage::from_pixel(20, 28, Rgb([90, 140, 60])))
        .write_to(&mut bytes, ImageOutputFormat::Jpeg(80))
        .expect("encode jpeg");
    bytes
}

/// Client that ignores proxy settings from the environment so loopback requests stay local.
fn local_assembler() -> ReportAssembler<HttpFetcher> {
    let client = reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("build client");
    ReportAssembler::new(HttpFetcher::new(client), AssemblerConfig::default())
}

#[tokio::test]
async fn http_404_cover_is_a_status_error() {
    let addr = serve(HashMap::from([("/back.jpg", jpeg())])).await;
    let cover_url = format!("http://{addr}/cover.jpg");
    let spec = ReportSpec::new(
        ImageSource::from_url(cover_url.clone()),
        ImageSource::from_url(format!("http://{addr}/back.jpg")),
    );

    let err = local_assembler()
        .assemble(&spec)
        .await
        .expect_err("a 404 cover must abort the report");

    match err.as_fetch_error() {
        Some(FetchError::Status { url, status }) => {
            assert_eq!(*status, 404);
            assert_eq!(url, &cover_url);
        }
        other => panic!("expected a 404 status error, got {other:?} ({err})"),
    }
}

#[tokio::test]
async fn http_404_back_cover_names_its_role() {
    let addr = serve(HashMap::from([("/cover.jpg", jpeg())])).await;
    let spec = ReportSpec::new(
        ImageSource::from_url(format!("http://{addr}/cover.jpg")),
        ImageSource::from_url(format!("http://{addr}/back.jpg")),
    );

    let err = local_assembler()
        .assemble(&spec)
        .await
        .expect_err("a 404 back cover must abort the report");

    assert!(matches!(
        err,
        ReportError::Fetch {
            role: "back cover",
            source: FetchError::Status { status: 404, .. }
        }
    ));
}

#[tokio::test]
async fn http_images_are_downloaded_and_embedded() {
    let addr = serve(HashMap::from([("/cover.jpg", jpeg()), ("/back.jpg", jpeg())])).await;
    let spec = ReportSpec::new(
        ImageSource::from_url(format!("http://{addr}/cover.jpg")),
        ImageSource::from_url(format!("http://{addr}/back.jpg")),
    )
    .with_chart(ImageSource::from_url(format!("http://{addr}/chart.png")));

    let bytes = local_assembler()
        .assemble(&spec)
        .await
        .expect("assemble report over HTTP");

    let document = Document::load_mem(&bytes).expect("output parses as PDF");
    assert_eq!(document.get_pages().len(), 2, "404 chart is left out");
}

#[tokio::test]
async fn configured_assembler_reports_status_errors() {
    // Loopback requests may be routed through an environment proxy; only a direct answer
    // carries the server's status.
    if ["HTTP_PROXY", "http_proxy", "ALL_PROXY", "all_proxy"]
        .iter()
        .any(|key| std::env::var_os(key).is_some())
    {
        return;
    }

    let addr = serve(HashMap::new()).await;
    let spec = ReportSpec::new(
        ImageSource::from_url(format!("http://{addr}/cover.jpg")),
        ImageSource::from_url(format!("http://{addr}/back.jpg")),
    );
    let assembler =
        ReportAssembler::from_config(AssemblerConfig::default()).expect("build assembler");

    let err = assembler
        .assemble(&spec)
        .await
        .expect_err("missing cover must fail");

    assert!(matches!(
        err.as_fetch_error(),
        Some(FetchError::Status { status: 404, .. })
    ));
}

#[test]
fn invalid_client_settings_are_a_client_error() {
    let mut config = AssemblerConfig::default();
    config.user_agent = "broken\nagent".to_string();

    let err = ReportAssembler::from_config(config).expect_err("invalid user agent");

    assert!(matches!(err, ReportError::Client(_)), "unexpected error: {err}");
    assert!(err.as_fetch_error().is_none());
}
