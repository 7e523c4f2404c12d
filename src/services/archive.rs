// src/services/archive.rs

//! ZIP archive assembly from resolved image URLs.

use std::io::{Cursor, Seek, Write};
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use reqwest::Client;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{AppError, Result};
use crate::models::HttpConfig;
use crate::utils::http::fetch_bytes;

const DEFAULT_EXTENSION: &str = "jpg";

/// A finished, fully buffered archive.
#[derive(Debug, Clone)]
pub struct Archive {
    data: Vec<u8>,
    entries: Vec<String>,
    failed: Vec<String>,
}

impl Archive {
    /// Entry names written, in order.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// URLs that could not be downloaded.
    pub fn failed(&self) -> &[String] {
        &self.failed
    }

    /// The complete ZIP file.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

/// Downloads images and packs them into a deflate ZIP.
#[derive(Debug, Clone)]
pub struct ArchiveAssembler {
    client: Client,
    timeout: Duration,
}

impl ArchiveAssembler {
    pub fn new(client: Client, config: &HttpConfig) -> Self {
        Self {
            client,
            timeout: Duration::from_secs(config.image_timeout_secs),
        }
    }

    /// Download every URL in order and archive the ones that succeed.
    ///
    /// Entry names follow the 1-based input position, so a failed download
    /// leaves a gap rather than shifting later names.
    pub async fn build(&self, image_urls: &[String]) -> Result<Archive> {
        if image_urls.is_empty() {
            return Err(AppError::NoImagesToDownload);
        }

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut entries = Vec::new();
        let mut failed = Vec::new();

        for (idx, image_url) in image_urls.iter().enumerate() {
            let position = idx + 1;
            log::info!("Downloading image {}: {}", position, image_url);

            let bytes = match fetch_bytes(&self.client, image_url, self.timeout).await {
                Ok(bytes) => bytes,
                Err(error) => {
                    log::error!("Failed to download image {}: {}", image_url, error);
                    failed.push(image_url.clone());
                    continue;
                }
            };

            let name = entry_name(position, image_url);
            if let Err(error) = write_entry(&mut zip, &name, &bytes, options) {
                log::error!("Unexpected error writing {} to archive: {}", image_url, error);
                failed.push(image_url.clone());
                continue;
            }
            entries.push(name);
        }

        let cursor = zip.finish()?;

        log::info!(
            "Archive ready: {} of {} images ({} failed)",
            entries.len(),
            image_urls.len(),
            failed.len()
        );

        Ok(Archive {
            data: cursor.into_inner(),
            entries,
            failed,
        })
    }
}

fn write_entry<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    name: &str,
    bytes: &[u8],
    options: FileOptions,
) -> Result<()> {
    zip.start_file(name, options)?;
    zip.write_all(bytes)?;
    Ok(())
}

/// `image_<n>.<ext>`, with the extension taken from the URL path when it
/// names a known image type.
pub fn entry_name(position: usize, image_url: &str) -> String {
    format!("image_{}.{}", position, image_extension(image_url))
}

fn image_extension(image_url: &str) -> String {
    static EXT: OnceLock<Option<Regex>> = OnceLock::new();
    let pattern = EXT.get_or_init(|| Regex::new(r"(?i)\.(jpe?g|png|gif|webp|bmp)$").ok());

    let path = url::Url::parse(image_url)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| image_url.to_string());

    pattern
        .as_ref()
        .and_then(|re| re.captures(&path))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_ascii_lowercase())
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_name_uses_url_extension() {
        assert_eq!(entry_name(1, "https://i.imx.to/i/2024/a.jpg"), "image_1.jpg");
        assert_eq!(entry_name(2, "https://i.imx.to/i/2024/b.PNG"), "image_2.png");
        assert_eq!(entry_name(3, "https://i.imx.to/x.webp?size=full"), "image_3.webp");
        assert_eq!(entry_name(4, "https://i.imx.to/x.jpeg#frag"), "image_4.jpeg");
    }

    #[test]
    fn test_entry_name_defaults_to_jpg() {
        assert_eq!(entry_name(7, "https://i.imx.to/raw/123"), "image_7.jpg");
        assert_eq!(entry_name(8, "https://i.imx.to/file.php"), "image_8.jpg");
        assert_eq!(entry_name(9, "not a url"), "image_9.jpg");
    }

    #[tokio::test]
    async fn test_empty_input_is_rejected() {
        let assembler = ArchiveAssembler::new(Client::new(), &HttpConfig::default());
        assert!(matches!(
            assembler.build(&[]).await,
            Err(AppError::NoImagesToDownload)
        ));
    }
}
