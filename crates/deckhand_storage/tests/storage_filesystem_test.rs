//! Tests for filesystem storage backend.

use deckhand_core::{StoredReference, UploadPolicy};
use deckhand_error::Remediation;
use deckhand_storage::{LocalMediaStorage, MediaRepository, StorageErrorKind};
use std::io;
use std::path::Path;
use std::pin::Pin;
use std::task::{Context, Poll};
use tempfile::TempDir;
use tokio::io::{AsyncRead, ReadBuf};

const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x01\0\0\0\x01";
const ZIP_HEADER: &[u8] = b"PK\x03\x04\x14\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0";

fn staged_files(dir: &Path) -> Vec<std::path::PathBuf> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect()
}

fn kind_of(err: deckhand_error::DeckhandError) -> StorageErrorKind {
    err.storage_kind().cloned().expect("storage error")
}

fn flashcard_notes(len: usize) -> Vec<u8> {
    b"Q: What does the mitochondria do?\nA: Produces ATP.\n"
        .iter()
        .copied()
        .cycle()
        .take(len)
        .collect()
}

/// Reader that yields some bytes and then fails.
struct FailingReader {
    sent: bool,
}

impl AsyncRead for FailingReader {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        if self.sent {
            return Poll::Ready(Err(io::Error::new(
                io::ErrorKind::ConnectionReset,
                "client went away",
            )));
        }
        self.sent = true;
        buf.put_slice(b"partial upload ");
        Poll::Ready(Ok(()))
    }
}

#[tokio::test]
async fn test_save_and_delete_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let storage = LocalMediaStorage::new(temp_dir.path(), UploadPolicy::default()).unwrap();

    let data = flashcard_notes(1024);
    let mut body: &[u8] = &data;
    let reference = storage.save(&mut body, "notes.txt").await.unwrap();

    assert!(storage.exists(&reference).await.unwrap());
    assert_eq!(std::fs::read(reference.as_str()).unwrap(), data);
    assert_eq!(storage.backend_name(), "filesystem");

    storage.delete(&reference).await.unwrap();
    assert!(!storage.exists(&reference).await.unwrap());
    assert!(staged_files(temp_dir.path()).is_empty());

    // Deleting again is not an error
    storage.delete(&reference).await.unwrap();
}

#[tokio::test]
async fn test_staged_name_uses_extension_not_stem() {
    let temp_dir = TempDir::new().unwrap();
    let storage = LocalMediaStorage::new(temp_dir.path(), UploadPolicy::default()).unwrap();

    let mut body: &[u8] = b"secret plans";
    let reference = storage.save(&mut body, "Top Secret.TXT").await.unwrap();

    let path = Path::new(reference.as_str());
    assert_eq!(path.parent().unwrap(), temp_dir.path());
    assert_eq!(path.extension().unwrap(), "txt");
    assert!(!reference.as_str().contains("Secret"));
}

#[tokio::test]
async fn test_same_filename_gets_distinct_references() {
    let temp_dir = TempDir::new().unwrap();
    let storage = LocalMediaStorage::new(temp_dir.path(), UploadPolicy::default()).unwrap();

    let mut first: &[u8] = b"first";
    let mut second: &[u8] = b"second";
    let a = storage.save(&mut first, "notes.txt").await.unwrap();
    let b = storage.save(&mut second, "notes.txt").await.unwrap();

    assert_ne!(a, b);
    assert_eq!(staged_files(temp_dir.path()).len(), 2);
}

#[tokio::test]
async fn test_pdf_accepted() {
    let temp_dir = TempDir::new().unwrap();
    let storage = LocalMediaStorage::new(temp_dir.path(), UploadPolicy::default()).unwrap();

    let mut body: &[u8] = b"%PDF-1.4\n1 0 obj\n<< /Type /Catalog >>\nendobj\n%%EOF\n";
    let reference = storage.save(&mut body, "report.pdf").await.unwrap();
    assert!(storage.exists(&reference).await.unwrap());
}

#[tokio::test]
async fn test_unsupported_extension_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let storage = LocalMediaStorage::new(temp_dir.path(), UploadPolicy::default()).unwrap();

    for filename in ["payload.exe", "image.png", "README", "archive.tar.gz"] {
        let mut body: &[u8] = b"perfectly fine text";
        let err = storage.save(&mut body, filename).await.unwrap_err();
        assert!(matches!(kind_of(err), StorageErrorKind::UnsupportedType(_)));
    }

    assert!(staged_files(temp_dir.path()).is_empty());
}

#[tokio::test]
async fn test_unsupported_extension_does_not_consume_stream() {
    let temp_dir = TempDir::new().unwrap();
    let storage = LocalMediaStorage::new(temp_dir.path(), UploadPolicy::default()).unwrap();

    let mut body: &[u8] = b"untouched";
    assert!(storage.save(&mut body, "payload.exe").await.is_err());
    assert_eq!(body, b"untouched");
}

#[tokio::test]
async fn test_disallowed_category_is_cleaned_up() {
    let temp_dir = TempDir::new().unwrap();
    let storage = LocalMediaStorage::new(temp_dir.path(), UploadPolicy::default()).unwrap();

    let mut body: &[u8] = PNG_HEADER;
    let err = storage.save(&mut body, "diagram.txt").await.unwrap_err();

    assert!(matches!(
        kind_of(err),
        StorageErrorKind::DisallowedContent(mime) if mime.starts_with("image/")
    ));
    assert!(staged_files(temp_dir.path()).is_empty());
}

#[tokio::test]
async fn test_any_text_subtype_accepted_as_txt() {
    let temp_dir = TempDir::new().unwrap();
    let storage = LocalMediaStorage::new(temp_dir.path(), UploadPolicy::default()).unwrap();

    let uploads: [(&str, &[u8]); 3] = [
        ("page.txt", b"<html><body><p>Mitosis has four phases.</p></body></html>\n"),
        ("cards.txt", b"<?xml version=\"1.0\"?>\n<deck><card>ATP</card></deck>\n"),
        ("script.txt", b"#!/bin/sh\necho 'flashcards'\n"),
    ];

    for (filename, content) in uploads {
        let mut body: &[u8] = content;
        let reference = storage.save(&mut body, filename).await.unwrap();
        assert_eq!(std::fs::read(reference.as_str()).unwrap(), content);
    }

    assert_eq!(staged_files(temp_dir.path()).len(), 3);
}

#[tokio::test]
async fn test_zip_disguised_as_pdf_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let storage = LocalMediaStorage::new(temp_dir.path(), UploadPolicy::default()).unwrap();

    let mut body: &[u8] = ZIP_HEADER;
    let err = storage.save(&mut body, "report.pdf").await.unwrap_err();

    assert!(matches!(kind_of(err), StorageErrorKind::DisallowedContent(_)));
    assert!(staged_files(temp_dir.path()).is_empty());
}

#[tokio::test]
async fn test_empty_upload_is_disallowed() {
    let temp_dir = TempDir::new().unwrap();
    let storage = LocalMediaStorage::new(temp_dir.path(), UploadPolicy::default()).unwrap();

    let mut body: &[u8] = b"";
    let err = storage.save(&mut body, "empty.txt").await.unwrap_err();

    assert!(matches!(kind_of(err), StorageErrorKind::DisallowedContent(_)));
    assert!(staged_files(temp_dir.path()).is_empty());
}

#[tokio::test]
async fn test_oversized_upload_leaves_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let storage = LocalMediaStorage::new(temp_dir.path(), UploadPolicy::default()).unwrap();

    let limit = 10 * 1024 * 1024;
    let data = flashcard_notes(limit + 1);
    let mut body: &[u8] = &data;
    let err = storage.save(&mut body, "huge.txt").await.unwrap_err();

    assert_eq!(
        kind_of(err),
        StorageErrorKind::TooLarge {
            size: limit as u64 + 1,
            max: limit as u64,
        }
    );
    assert!(staged_files(temp_dir.path()).is_empty());
}

#[tokio::test]
async fn test_exactly_at_limit_is_accepted() {
    let temp_dir = TempDir::new().unwrap();
    let policy = UploadPolicy::builder().max_size_bytes(64).build();
    let storage = LocalMediaStorage::new(temp_dir.path(), policy).unwrap();

    let data = flashcard_notes(64);
    let mut body: &[u8] = &data;
    assert!(storage.save(&mut body, "fits.txt").await.is_ok());
}

#[tokio::test]
async fn test_injected_one_byte_policy() {
    let temp_dir = TempDir::new().unwrap();
    let policy = UploadPolicy::builder().max_size_bytes(1).build();
    let storage = LocalMediaStorage::new(temp_dir.path(), policy).unwrap();

    let mut body: &[u8] = b"ab";
    let err = storage.save(&mut body, "tiny.txt").await.unwrap_err();

    assert_eq!(kind_of(err), StorageErrorKind::TooLarge { size: 2, max: 1 });
    assert!(staged_files(temp_dir.path()).is_empty());
}

#[tokio::test]
async fn test_streaming_cap_stops_copy_early() {
    let temp_dir = TempDir::new().unwrap();
    let policy = UploadPolicy::builder()
        .max_size_bytes(16)
        .enforce_size_while_streaming(true)
        .build();
    let storage = LocalMediaStorage::new(temp_dir.path(), policy).unwrap();

    let data = flashcard_notes(4096);
    let mut body: &[u8] = &data;
    let err = storage.save(&mut body, "long.txt").await.unwrap_err();

    assert_eq!(kind_of(err), StorageErrorKind::TooLarge { size: 17, max: 16 });
    // Only limit + 1 bytes were pulled from the stream
    assert_eq!(body.len(), 4096 - 17);
    assert!(staged_files(temp_dir.path()).is_empty());
}

#[tokio::test]
async fn test_stream_failure_is_io_error_and_cleaned_up() {
    let temp_dir = TempDir::new().unwrap();
    let storage = LocalMediaStorage::new(temp_dir.path(), UploadPolicy::default()).unwrap();

    let mut body = FailingReader { sent: false };
    let err = storage.save(&mut body, "notes.txt").await.unwrap_err();

    let kind = kind_of(err);
    assert!(matches!(kind, StorageErrorKind::Io(_)));
    assert!(!kind.is_rejection());
    assert!(staged_files(temp_dir.path()).is_empty());
}

#[tokio::test]
async fn test_delete_missing_reference_succeeds() {
    let temp_dir = TempDir::new().unwrap();
    let storage = LocalMediaStorage::new(temp_dir.path(), UploadPolicy::default()).unwrap();

    let missing = StoredReference::new(
        temp_dir
            .path()
            .join("0123456789abcdef0123456789abcdef.txt")
            .to_string_lossy()
            .to_string(),
    );

    storage.delete(&missing).await.unwrap();
    assert!(!storage.exists(&missing).await.unwrap());
}

#[tokio::test]
async fn test_delete_outside_staging_dir_is_refused() {
    let temp_dir = TempDir::new().unwrap();
    let staging = temp_dir.path().join("staging");
    let storage = LocalMediaStorage::new(&staging, UploadPolicy::default()).unwrap();

    let victim = temp_dir.path().join("keep.txt");
    std::fs::write(&victim, b"do not delete").unwrap();

    for reference in [
        victim.to_string_lossy().to_string(),
        staging.join("../keep.txt").to_string_lossy().to_string(),
        "/nonexistent/elsewhere/gone.txt".to_string(),
    ] {
        let err = storage
            .delete(&StoredReference::new(reference))
            .await
            .unwrap_err();
        let kind = kind_of(err);
        assert!(matches!(kind, StorageErrorKind::InvalidReference(_)));
        assert_eq!(kind.remediation(), Remediation::FixReference);
        assert!(kind.is_caller_error());
        assert!(!kind.is_rejection());
    }

    assert!(victim.exists());
}

#[tokio::test]
async fn test_creates_missing_staging_dir() {
    let temp_dir = TempDir::new().unwrap();
    let nested = temp_dir.path().join("a").join("b");

    let storage = LocalMediaStorage::new(&nested, UploadPolicy::default()).unwrap();

    assert!(nested.is_dir());
    assert_eq!(storage.staging_dir(), nested.as_path());
}

#[tokio::test]
async fn test_concurrent_saves_are_independent() {
    let temp_dir = TempDir::new().unwrap();
    let storage = std::sync::Arc::new(
        LocalMediaStorage::new(temp_dir.path(), UploadPolicy::default()).unwrap(),
    );

    let mut handles = Vec::new();
    for i in 0..8 {
        let storage = storage.clone();
        handles.push(tokio::spawn(async move {
            let data = format!("card {}\n", i).repeat(32);
            let mut body: &[u8] = data.as_bytes();
            storage.save(&mut body, "card.txt").await.unwrap()
        }));
    }

    let mut references = Vec::new();
    for handle in handles {
        references.push(handle.await.unwrap());
    }
    references.sort();
    references.dedup();

    assert_eq!(references.len(), 8);
    assert_eq!(staged_files(temp_dir.path()).len(), 8);
}
