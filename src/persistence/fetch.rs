//! Raw archive download
//!
//! The archive is streamed into a temporary file inside the destination directory, unpacked
//! into a staging directory on a blocking thread, and only then moved into place. A failed
//! download or a corrupt archive leaves the destination untouched.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::{NamedTempFile, TempDir};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Fetch errors
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Unpack task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub type FetchResult<T> = Result<T, FetchError>;

/// Download the zip archive at `url` and unpack it into `dest_dir`
///
/// `timeout` bounds connecting and every single read, so a stalled transfer fails while a slow
/// but steady one completes. Returns the top-level paths created in `dest_dir`.
pub async fn fetch_archive(url: &str, dest_dir: &Path, timeout: Duration) -> FetchResult<Vec<PathBuf>> {
    tokio::fs::create_dir_all(dest_dir).await?;
    info!("Downloading {} into {:?}", url, dest_dir);

    let client = reqwest::Client::builder()
        .connect_timeout(timeout)
        .read_timeout(timeout)
        .build()?;
    let mut response = client.get(url).send().await?.error_for_status()?;
    let archive = NamedTempFile::new_in(dest_dir)?;
    let mut file = tokio::fs::File::from_std(archive.reopen()?);
    let mut downloaded = 0usize;
    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk).await?;
        downloaded += chunk.len();
    }
    file.flush().await?;
    drop(file);
    debug!("Downloaded {} bytes", downloaded);

    let dest = dest_dir.to_path_buf();
    let extracted = tokio::task::spawn_blocking(move || unpack(archive, &dest)).await??;
    info!("Extracted {} entries into {:?}", extracted.len(), dest_dir);
    Ok(extracted)
}

/// Unpack a zip archive into `dest_dir` via a staging directory
pub fn unpack_archive(archive: &Path, dest_dir: &Path) -> FetchResult<Vec<PathBuf>> {
    fs::create_dir_all(dest_dir)?;
    let staging = TempDir::new_in(dest_dir)?;
    let mut zip = zip::ZipArchive::new(fs::File::open(archive)?)?;
    zip.extract(staging.path())?;

    let mut placed = Vec::new();
    for entry in fs::read_dir(staging.path())? {
        let entry = entry?;
        let target = dest_dir.join(entry.file_name());
        if target.is_dir() {
            fs::remove_dir_all(&target)?;
        } else if target.exists() {
            fs::remove_file(&target)?;
        }
        fs::rename(entry.path(), &target)?;
        placed.push(target);
    }
    placed.sort();
    Ok(placed)
}

fn unpack(archive: NamedTempFile, dest_dir: &Path) -> FetchResult<Vec<PathBuf>> {
    // the temporary archive is deleted when `archive` drops
    unpack_archive(archive.path(), dest_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_zip(path: &Path, entries: &[(&str, &str)]) {
        let file = fs::File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);
        for (name, content) in entries {
            zip.start_file(*name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_unpack_archive() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("kg.zip");
        write_zip(&archive, &[("kg.links.tsv", "A\tB\tx\tr\ty\n")]);

        let dest = dir.path().join("raw");
        fs::create_dir_all(&dest).unwrap();
        fs::write(dest.join("kg.links.tsv"), "stale").unwrap();

        let placed = unpack_archive(&archive, &dest).unwrap();
        assert_eq!(placed, vec![dest.join("kg.links.tsv")]);
        assert_eq!(
            fs::read_to_string(dest.join("kg.links.tsv")).unwrap(),
            "A\tB\tx\tr\ty\n"
        );
        // staging directory is gone
        assert_eq!(fs::read_dir(&dest).unwrap().count(), 1);
    }

    #[test]
    fn test_corrupt_archive_leaves_destination() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("bad.zip");
        fs::write(&archive, b"definitely not a zip").unwrap();

        let dest = dir.path().join("raw");
        let result = unpack_archive(&archive, &dest);
        assert!(matches!(result, Err(FetchError::Zip(_))));
        assert_eq!(fs::read_dir(&dest).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_stalled_server_times_out() {
        // accepts connections but never answers
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/kg.zip", listener.local_addr().unwrap());

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("raw");
        let started = std::time::Instant::now();
        let result = fetch_archive(&url, &dest, Duration::from_millis(200)).await;

        assert!(matches!(result, Err(FetchError::Http(_))));
        assert!(started.elapsed() < Duration::from_secs(10));
        assert_eq!(fs::read_dir(&dest).unwrap().count(), 0);
        drop(listener);
    }
}
