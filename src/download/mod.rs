mod progress;

pub use progress::Progress;

use anyhow::{Context, Result};
use futures_util::StreamExt;
use std::path::{Path, PathBuf};
use tokio::{fs::File, io::AsyncWriteExt};

use crate::log::{download_complete, downloading_box, progress_dot, unknown_size};

/// Used when the URL doesn't end in something resembling a file name
const FALLBACK_FILENAME: &str = "box.tar.gz";

/// File name the box at `url` is saved as
#[must_use]
pub fn archive_filename(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|url| {
            url.path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .filter(|name| !name.is_empty() && name != "." && name != "..")
        .unwrap_or_else(|| FALLBACK_FILENAME.to_string())
}

/// Downloads the box archive at `url` into `dir`, printing a dot for every percent.
/// The body is streamed to disk, never held in memory.
///
/// # Errors
///
/// - The server could not be reached, or answered with an error status
/// - The connection dropped mid-body
/// - Filesystem out of space
///
/// # Returns
///
/// The path of the downloaded archive
pub async fn download_box(url: &str, dir: &Path) -> Result<PathBuf> {
    downloading_box(url);

    let response = reqwest::get(url)
        .await
        .with_context(|| format!("Unable to create response for url: {url}"))?
        .error_for_status()
        .with_context(|| format!("HTTP error fetching {url}"))?;

    let archive_path = dir.join(archive_filename(url));
    let mut archive_file = File::create(&archive_path)
        .await
        .with_context(|| format!("Unable to create {}", archive_path.display()))?;

    let mut progress = Progress::new(response.content_length());
    if progress.total().is_none() {
        unknown_size(url);
    }

    let mut body = response.bytes_stream();
    while let Some(chunk) = body.next().await {
        let chunk = chunk.with_context(|| format!("Error reading body of {url}"))?;

        // `write_all` fails on a short write
        archive_file
            .write_all(&chunk)
            .await
            .with_context(|| format!("Error writing {}", archive_path.display()))?;

        if progress.advance(chunk.len() as u64) {
            progress_dot()?;
        }
    }

    archive_file.flush().await?;
    download_complete();

    Ok(archive_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::{
        fs,
        io::{Read, Write},
        net::TcpListener,
        thread,
    };
    use temp_dir::TempDir;
    use tokio::runtime::Runtime;

    fn run_async_test<F: std::future::Future<Output = ()>>(f: F) {
        let rt = Runtime::new().unwrap();
        rt.block_on(f);
    }

    /// Answers a single request with `response`, then hangs up
    fn serve_once(response: &'static [u8]) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();

            // Drain the request headers so closing doesn't reset the connection
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|window| window == b"\r\n\r\n") {
                let read = stream.read(&mut buf).unwrap();
                if read == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..read]);
            }

            stream.write_all(response).unwrap();
        });

        format!("http://{addr}/boxes/test.tar.gz")
    }

    #[test]
    fn test_archive_filename() {
        assert_eq!(
            archive_filename("https://example.com/boxes/ubuntu.tar.xz"),
            "ubuntu.tar.xz"
        );
        assert_eq!(
            archive_filename("https://example.com/boxes/debian.tgz?token=abc"),
            "debian.tgz"
        );
        assert_eq!(archive_filename("https://example.com/"), FALLBACK_FILENAME);
        assert_eq!(archive_filename("not a url"), FALLBACK_FILENAME);
    }

    #[test]
    fn test_download_box_success() {
        run_async_test(async {
            let temp_dir = TempDir::new().unwrap();
            let data = vec![7u8; 64 * 1024];

            let server = MockServer::start();
            let _mock = server.mock(|when, then| {
                when.method(GET).path("/boxes/test.tar.gz");
                then.status(200).body(&data);
            });

            let path = download_box(&server.url("/boxes/test.tar.gz"), temp_dir.path())
                .await
                .unwrap();

            assert_eq!(path, temp_dir.path().join("test.tar.gz"));
            assert_eq!(fs::read(path).unwrap(), data);
        });
    }

    #[test]
    fn test_download_box_error_status() {
        run_async_test(async {
            let temp_dir = TempDir::new().unwrap();

            let server = MockServer::start();
            let _mock = server.mock(|when, then| {
                when.any_request();
                then.status(404).body("no such box");
            });

            let result = download_box(&server.url("/missing.tar.gz"), temp_dir.path()).await;

            assert!(result.is_err(), "Expected a 404 to fail");
            assert!(!temp_dir.path().join("missing.tar.gz").exists());
        });
    }

    #[test]
    fn test_download_box_unreachable() {
        run_async_test(async {
            let temp_dir = TempDir::new().unwrap();

            let result = download_box("http://127.0.0.1:1/box.tar.gz", temp_dir.path()).await;

            assert!(result.is_err());
        });
    }

    #[test]
    fn test_download_box_truncated_body() {
        run_async_test(async {
            let temp_dir = TempDir::new().unwrap();
            let url = serve_once(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\nabc");

            let err = download_box(&url, temp_dir.path()).await.unwrap_err();

            assert!(
                err.to_string().contains("Error reading body"),
                "Unexpected error: {err:#}"
            );
        });
    }

    #[test]
    fn test_download_box_without_content_length() {
        run_async_test(async {
            let temp_dir = TempDir::new().unwrap();
            let url = serve_once(b"HTTP/1.1 200 OK\r\nConnection: close\r\n\r\nabcdef");

            let path = download_box(&url, temp_dir.path()).await.unwrap();

            assert_eq!(fs::read(path).unwrap(), b"abcdef");
        });
    }
}
