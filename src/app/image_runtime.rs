//! Background thumbnail decoding to keep the UI thread responsive.

use std::path::PathBuf;

use image::RgbaImage;
use tokio::sync::mpsc;

use crate::core::gallery::{self, GalleryError};

pub enum ImageUpdate {
    Thumbnail {
        path: PathBuf,
        result: Result<RgbaImage, GalleryError>,
    },
}

pub fn spawn_thumbnail_decode(
    tx: mpsc::UnboundedSender<ImageUpdate>,
    path: PathBuf,
    max_w: u32,
    max_h: u32,
) {
    std::thread::spawn(move || {
        let result = gallery::load_thumbnail(&path, max_w, max_h);
        let _ = tx.send(ImageUpdate::Thumbnail { path, result });
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn decoded_thumbnail_arrives_on_channel() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("red.png");
        RgbaImage::from_pixel(64, 32, image::Rgba([255, 0, 0, 255]))
            .save(&path)
            .unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        spawn_thumbnail_decode(tx, path.clone(), 16, 16);

        let Some(ImageUpdate::Thumbnail { path: got, result }) = rx.recv().await else {
            panic!("channel closed");
        };
        assert_eq!(got, path);
        let thumb = result.unwrap();
        assert!(thumb.width() <= 16 && thumb.height() <= 16);
    }

    #[tokio::test]
    async fn undecodable_file_reports_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not a png").unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        spawn_thumbnail_decode(tx, path, 16, 16);

        let Some(ImageUpdate::Thumbnail { result, .. }) = rx.recv().await else {
            panic!("channel closed");
        };
        assert!(result.is_err());
    }
}
