use std::io::Cursor;

use image::{ImageFormat, Rgba, RgbaImage};
use pokecard::ingest::{self, MAX_UPLOAD_BYTES};
use pokecard::{Error, UploadedFile};

fn png_bytes() -> Vec<u8> {
    let img = RgbaImage::from_pixel(4, 4, Rgba([200, 40, 40, 255]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

#[tokio::test]
async fn non_image_is_rejected() {
    let file = UploadedFile::from_bytes("notes.txt", "text/plain", b"hello".to_vec());
    assert!(matches!(ingest::ingest(&file).await, Err(Error::InvalidType(_))));
}

#[tokio::test]
async fn type_is_checked_before_size() {
    let file = UploadedFile::from_bytes("notes.txt", "text/plain", vec![0])
        .with_declared_size(MAX_UPLOAD_BYTES * 4);
    assert!(matches!(ingest::ingest(&file).await, Err(Error::InvalidType(_))));
}

#[tokio::test]
async fn size_limit_is_inclusive() {
    let limit = MAX_UPLOAD_BYTES as usize;

    let at_limit = UploadedFile::from_bytes("big.png", "image/png", vec![0; limit]);
    assert!(ingest::ingest(&at_limit).await.is_ok());

    let over = UploadedFile::from_bytes("big.png", "image/png", vec![0; limit + 1]);
    match ingest::ingest(&over).await {
        Err(Error::TooLarge { size, limit }) => {
            assert_eq!(size, MAX_UPLOAD_BYTES + 1);
            assert_eq!(limit, MAX_UPLOAD_BYTES);
        }
        other => panic!("expected TooLarge, got {:?}", other),
    }
}

#[tokio::test]
async fn custom_limit_applies() {
    let file = UploadedFile::from_bytes("a.gif", "image/gif", vec![0; 11]);
    assert!(matches!(
        ingest::ingest_with_limit(&file, 10).await,
        Err(Error::TooLarge { .. })
    ));
    assert!(ingest::ingest_with_limit(&file, 11).await.is_ok());
}

#[tokio::test]
async fn disk_file_becomes_data_uri() {
    let dir = std::env::temp_dir().join(format!("pokecard-ingest-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("art.PNG");
    let bytes = png_bytes();
    std::fs::write(&path, &bytes).unwrap();

    let file = UploadedFile::from_path(&path).await.unwrap();
    assert_eq!(file.mime_type, "image/png");
    assert_eq!(file.size, bytes.len() as u64);

    let image = ingest::ingest(&file).await.unwrap();
    assert!(image.as_data_uri().starts_with("data:image/png;base64,"));
    assert_eq!(image.decode_bytes().unwrap(), bytes);

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn unknown_extension_reads_as_non_image() {
    let dir = std::env::temp_dir().join(format!("pokecard-ingest-ext-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("art.bmpx");
    std::fs::write(&path, png_bytes()).unwrap();

    let file = UploadedFile::from_path(&path).await.unwrap();
    assert!(matches!(ingest::ingest(&file).await, Err(Error::InvalidType(_))));

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn missing_file_fails_to_read() {
    let res = UploadedFile::from_path("/definitely/not/here.png").await;
    assert!(matches!(res, Err(Error::ReadFailed(_))));
}
