//! Playlist acquisition: local files, discovery and HTTP downloads.
//!
//! Everything here returns `Result<_, AppError>`; the caller decides whether
//! a failure ends the session.

use crate::config::Settings;
use crate::error::{AppError, Result};
use log::{debug, info, warn};
use reqwest::StatusCode;
use std::fmt;
use std::fs;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::sleep;

/// Base delay between retries in milliseconds (doubles each retry).
const BASE_RETRY_DELAY_MS: u64 = 500;

const USER_AGENT: &str = concat!("playlist-selector/", env!("CARGO_PKG_VERSION"));

/// Where a playlist comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaylistSource {
    /// A file on disk
    Local(PathBuf),
    /// An http(s) URL
    Remote(String),
}

impl PlaylistSource {
    /// Interpret user input as a URL, a `file://` reference or a path.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(AppError::InvalidInput("empty playlist source".to_string()));
        }
        if input.starts_with("http://") || input.starts_with("https://") {
            return Ok(PlaylistSource::Remote(input.to_string()));
        }
        if let Some(path) = input.strip_prefix("file://") {
            return Ok(PlaylistSource::Local(expand_home(path)));
        }
        if let Some((scheme, _)) = input.split_once("://") {
            return Err(AppError::InvalidInput(format!(
                "unsupported scheme '{}': use http, https or file",
                scheme
            )));
        }
        Ok(PlaylistSource::Local(expand_home(input)))
    }

    /// Whether the source looks usable without touching the network.
    pub fn is_plausible(&self) -> bool {
        match self {
            PlaylistSource::Local(path) => path.is_file(),
            PlaylistSource::Remote(_) => true,
        }
    }
}

impl fmt::Display for PlaylistSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaylistSource::Local(path) => write!(f, "{}", path.display()),
            PlaylistSource::Remote(url) => write!(f, "{}", url),
        }
    }
}

/// A playlist ready to parse.
#[derive(Debug, Clone)]
pub struct Acquired {
    pub source: PlaylistSource,
    /// Local file holding the text; saved selections are stored beside it.
    pub path: PathBuf,
    pub text: String,
}

/// Expand a leading `~/` to the home directory.
fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}

/// First `*.m3u` or `*.m3u8` file in `dir`, in sorted order.
pub fn discover_playlist(dir: &Path) -> Result<Option<PathBuf>> {
    let mut found = Vec::new();
    for extension in ["m3u", "m3u8"] {
        let pattern = dir.join(format!("*.{}", extension));
        for entry in glob::glob(&pattern.to_string_lossy())? {
            match entry {
                Ok(path) if path.is_file() => found.push(path),
                Ok(_) => {}
                Err(e) => debug!("Skipping unreadable entry: {}", e),
            }
        }
    }
    found.sort();
    debug!("Discovered {} playlist(s) in {}", found.len(), dir.display());
    Ok(found.into_iter().next())
}

/// Read a local playlist. Invalid UTF-8 is replaced, not rejected.
pub fn read_local(path: &Path) -> Result<Acquired> {
    if !path.is_file() {
        return Err(AppError::Acquisition(format!(
            "File not found: {}",
            path.display()
        )));
    }
    let bytes = fs::read(path)
        .map_err(|e| AppError::Acquisition(format!("Failed to read {}: {}", path.display(), e)))?;
    let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

    Ok(Acquired {
        source: PlaylistSource::Local(path.clone()),
        path,
        text: String::from_utf8_lossy(&bytes).into_owned(),
    })
}

/// Load the playlist text for `source`.
///
/// Remote playlists are checked with a HEAD request, downloaded with
/// retries, and stored under the download directory.
pub async fn acquire(source: &PlaylistSource, settings: &Settings) -> Result<Acquired> {
    match source {
        PlaylistSource::Local(path) => read_local(path),
        PlaylistSource::Remote(url) => {
            let client = build_client(settings)?;

            probe_url(&client, url, Duration::from_secs(settings.probe_timeout_secs)).await?;
            let text = fetch_text(&client, url, settings.fetch_retries).await?;

            let dir = settings.download_dir();
            fs::create_dir_all(&dir)?;
            let path = dir.join(download_file_name(url));
            fs::write(&path, &text)?;
            info!("Saved download to {}", path.display());

            Ok(Acquired {
                source: source.clone(),
                path,
                text,
            })
        }
    }
}

fn build_client(settings: &Settings) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(settings.fetch_timeout_secs))
        .build()?)
}

/// Check that a remote playlist answers before it is accepted.
pub async fn check_remote(url: &str, settings: &Settings) -> Result<()> {
    let client = build_client(settings)?;
    probe_url(&client, url, Duration::from_secs(settings.probe_timeout_secs)).await
}

/// Check that `url` exists with a bounded HEAD request.
///
/// Servers that refuse HEAD (405) are given the benefit of the doubt.
pub async fn probe_url(client: &reqwest::Client, url: &str, timeout: Duration) -> Result<()> {
    debug!("Probing {}", url);
    let response = client
        .head(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| AppError::Acquisition(format!("{} is not reachable: {}", url, e)))?;

    let status = response.status();
    if status.is_success() || status == StatusCode::METHOD_NOT_ALLOWED {
        Ok(())
    } else {
        Err(AppError::Acquisition(format!("{} answered {}", url, status)))
    }
}

/// GET `url` as text, retrying retryable failures.
pub async fn fetch_text(client: &reqwest::Client, url: &str, retries: u32) -> Result<String> {
    info!("Downloading {}", url);
    let response = retry_with_backoff(&format!("Download of {}", url), retries, || {
        let client = client.clone();
        let url = url.to_string();
        async move { client.get(&url).send().await?.error_for_status() }
    })
    .await?;

    let bytes = response
        .bytes()
        .await
        .map_err(|e| AppError::Acquisition(format!("Failed to read response from {}: {}", url, e)))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Check if an error is retryable (network errors, timeouts, server errors).
fn is_retryable_error(error: &reqwest::Error) -> bool {
    error.is_timeout()
        || error.is_connect()
        || error.is_request()
        || error.status().map(|s| s.is_server_error()).unwrap_or(false)
}

/// Retry an async operation with exponential backoff.
async fn retry_with_backoff<T, F, Fut>(operation_name: &str, max_retries: u32, f: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = std::result::Result<T, reqwest::Error>>,
{
    let mut attempt = 0;
    loop {
        match f().await {
            Ok(result) => {
                if attempt > 0 {
                    info!("{} succeeded after {} attempts", operation_name, attempt + 1);
                }
                return Ok(result);
            }
            Err(e) if attempt < max_retries && is_retryable_error(&e) => {
                let delay = Duration::from_millis(
                    BASE_RETRY_DELAY_MS.saturating_mul(2_u64.saturating_pow(attempt)),
                );
                warn!(
                    "{} failed (attempt {}/{}): {}. Retrying in {:?}...",
                    operation_name,
                    attempt + 1,
                    max_retries + 1,
                    e,
                    delay
                );
                sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                return Err(AppError::Acquisition(format!("{} failed: {}", operation_name, e)));
            }
        }
    }
}

/// File name for a downloaded playlist: host and last path segment.
///
/// The query string is left out, since IPTV links often carry credentials
/// there.
pub fn download_file_name(url: &str) -> String {
    let rest = url.split_once("://").map(|(_, r)| r).unwrap_or(url);
    let rest = rest.split(['?', '#']).next().unwrap_or(rest);
    let (host, path) = rest.split_once('/').unwrap_or((rest, ""));
    let segment = path.rsplit('/').find(|s| !s.is_empty()).unwrap_or("");

    let raw = if segment.is_empty() {
        host.to_string()
    } else {
        format!("{}_{}", host, segment)
    };
    let mut name: String = raw
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '-' | '_' => c,
            _ => '_',
        })
        .collect();

    if name.is_empty() {
        name.push_str("downloaded");
    }
    if !(name.ends_with(".m3u") || name.ends_with(".m3u8")) {
        name.push_str(".m3u");
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    fn read_request(stream: &mut TcpStream) -> String {
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            match stream.read(&mut buf) {
                Ok(0) | Err(_) => break,
                Ok(n) => request.extend_from_slice(&buf[..n]),
            }
        }
        String::from_utf8_lossy(&request).into_owned()
    }

    /// Answer HEAD with 200 and GET with `get_status`, counting GETs.
    fn serve(get_status: u16, body: &'static str) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let gets = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&gets);

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { break };
                let request = read_request(&mut stream);
                let (status, payload) = if request.starts_with("GET") {
                    counter.fetch_add(1, Ordering::SeqCst);
                    (get_status, body)
                } else {
                    (200, "")
                };
                let reason = if status == 200 { "OK" } else { "Error" };
                let response = format!(
                    "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    reason,
                    payload.len(),
                    payload
                );
                let _ = stream.write_all(response.as_bytes());
            }
        });

        (format!("http://{}", addr), gets)
    }

    fn closed_port_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}/tv.m3u", addr)
    }

    fn remote_settings(download_dir: &Path) -> Settings {
        let mut settings = Settings::new();
        settings.download_dir = Some(download_dir.to_string_lossy().into_owned());
        settings.fetch_timeout_secs = 5;
        settings.probe_timeout_secs = 1;
        settings
    }

    #[tokio::test]
    async fn test_acquire_refused_port_is_acquisition_error() {
        let dir = tempfile::tempdir().unwrap();
        let settings = remote_settings(dir.path());
        let source = PlaylistSource::Remote(closed_port_url());

        let err = acquire(&source, &settings).await.unwrap_err();
        assert!(matches!(err, AppError::Acquisition(_)));
    }

    #[tokio::test]
    async fn test_acquire_unresponsive_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            let mut held = Vec::new();
            for stream in listener.incoming() {
                held.push(stream);
            }
        });

        let dir = tempfile::tempdir().unwrap();
        let settings = remote_settings(dir.path());
        let source = PlaylistSource::Remote(format!("http://{}/tv.m3u", addr));

        let result = tokio::time::timeout(Duration::from_secs(10), acquire(&source, &settings))
            .await
            .expect("acquire should give up on its own");
        assert!(matches!(result, Err(AppError::Acquisition(_))));
    }

    #[tokio::test]
    async fn test_acquire_retries_server_errors() {
        let (base, gets) = serve(500, "");
        let dir = tempfile::tempdir().unwrap();
        let mut settings = remote_settings(dir.path());
        settings.fetch_retries = 1;
        let source = PlaylistSource::Remote(format!("{}/tv.m3u", base));

        let err = acquire(&source, &settings).await.unwrap_err();
        assert!(matches!(err, AppError::Acquisition(_)));
        assert_eq!(gets.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_acquire_saves_download() {
        let body = "#EXTM3U\n#EXTINF:-1,News 1\nhttp://x/n1\n";
        let (base, gets) = serve(200, body);
        let dir = tempfile::tempdir().unwrap();
        let settings = remote_settings(dir.path());
        let url = format!("{}/lists/tv.m3u?token=secret", base);
        let source = PlaylistSource::Remote(url.clone());

        let acquired = acquire(&source, &settings).await.unwrap();
        assert_eq!(acquired.source, source);
        assert_eq!(acquired.text, body);
        assert_eq!(acquired.path, dir.path().join(download_file_name(&url)));
        assert_eq!(fs::read_to_string(&acquired.path).unwrap(), body);
        assert!(!acquired.path.to_string_lossy().contains("secret"));
        assert_eq!(gets.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_check_remote() {
        let dir = tempfile::tempdir().unwrap();
        let settings = remote_settings(dir.path());
        let (base, _) = serve(200, "");

        assert!(check_remote(&format!("{}/tv.m3u", base), &settings).await.is_ok());
        assert!(check_remote(&closed_port_url(), &settings).await.is_err());
    }

    #[test]
    fn test_parse_sources() {
        assert_eq!(
            PlaylistSource::parse("https://example.com/tv.m3u").unwrap(),
            PlaylistSource::Remote("https://example.com/tv.m3u".to_string())
        );
        assert_eq!(
            PlaylistSource::parse("file:///tmp/tv.m3u").unwrap(),
            PlaylistSource::Local(PathBuf::from("/tmp/tv.m3u"))
        );
        assert_eq!(
            PlaylistSource::parse(" lists/tv.m3u ").unwrap(),
            PlaylistSource::Local(PathBuf::from("lists/tv.m3u"))
        );
        assert!(matches!(
            PlaylistSource::parse("ftp://example.com/tv.m3u"),
            Err(AppError::InvalidInput(_))
        ));
        assert!(PlaylistSource::parse("  ").is_err());
    }

    #[test]
    fn test_download_file_name() {
        assert_eq!(
            download_file_name("http://example.com:8080/lists/tv.m3u8?token=abc"),
            "example.com_8080_tv.m3u8"
        );
        assert_eq!(
            download_file_name("http://host/get.php?username=u&password=p"),
            "host_get.php.m3u"
        );
        assert_eq!(download_file_name("https://host/"), "host.m3u");
    }

    #[test]
    fn test_read_local_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_local(&dir.path().join("absent.m3u")).unwrap_err();
        assert!(matches!(err, AppError::Acquisition(_)));
    }

    #[test]
    fn test_read_local_tolerates_bad_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tv.m3u");
        fs::write(&path, b"#EXTM3U\n\xff\xfe\n").unwrap();

        let acquired = read_local(&path).unwrap();
        assert!(acquired.text.starts_with("#EXTM3U"));
        assert!(acquired.path.is_absolute());
    }

    #[test]
    fn test_discover_playlist_picks_first_sorted() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover_playlist(dir.path()).unwrap().is_none());

        fs::write(dir.path().join("b.m3u8"), "").unwrap();
        fs::write(dir.path().join("a.m3u"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();

        let found = discover_playlist(dir.path()).unwrap().unwrap();
        assert_eq!(found.file_name().unwrap(), "a.m3u");
    }

    #[test]
    fn test_local_source_plausibility() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tv.m3u");
        assert!(!PlaylistSource::Local(path.clone()).is_plausible());
        fs::write(&path, "").unwrap();
        assert!(PlaylistSource::Local(path).is_plausible());
        assert!(PlaylistSource::Remote("http://x".to_string()).is_plausible());
    }
}
