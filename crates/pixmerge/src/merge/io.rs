use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageError, ImageFormat};
use tracing::info;

use crate::buffer::PixelBuffer;
use crate::error::{MergeError, Result};

/// Decode, encode and display collaborators used by the [`Merger`](super::Merger).
pub trait ImageIo {
    /// Decode `path` into an RGBA buffer.
    fn decode(&self, path: &Path) -> Result<PixelBuffer>;
    fn encode(&mut self, buffer: &PixelBuffer, path: &Path) -> Result<()>;
    /// Show `buffer` to the user. Nothing is read back.
    fn display(&mut self, buffer: &PixelBuffer) -> Result<()>;
}

/// Filesystem-backed I/O via the `image` crate.
///
/// `display` writes a numbered preview PNG into `preview_dir` (the system
/// temp dir by default) and logs its path.
#[derive(Debug, Default)]
pub struct FsImageIo {
    preview_dir: Option<PathBuf>,
    previews: u32,
}

impl FsImageIo {
    pub fn with_preview_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            preview_dir: Some(dir.into()),
            previews: 0,
        }
    }

    pub fn preview_dir(&self) -> Option<&Path> {
        self.preview_dir.as_deref()
    }

    fn next_preview_path(&mut self) -> PathBuf {
        self.previews += 1;
        let dir = self
            .preview_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir);
        dir.join(format!(
            "pixmerge-preview-{}-{}.png",
            std::process::id(),
            self.previews
        ))
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| MergeError::Encode {
            path: path.to_path_buf(),
            source: ImageError::IoError(e),
        })?;
    }
    Ok(())
}

impl ImageIo for FsImageIo {
    fn decode(&self, path: &Path) -> Result<PixelBuffer> {
        let image = image::open(path).map_err(|source| MergeError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(PixelBuffer::from_image(image.to_rgba8()))
    }

    fn encode(&mut self, buffer: &PixelBuffer, path: &Path) -> Result<()> {
        ensure_parent(path)?;
        // JPEG has no alpha channel; the encoder rejects RGBA input.
        let saved = match ImageFormat::from_path(path) {
            Ok(ImageFormat::Jpeg) => DynamicImage::ImageRgba8(buffer.as_image().clone())
                .to_rgb8()
                .save(path),
            _ => buffer.as_image().save(path),
        };
        saved.map_err(|source| MergeError::Encode {
            path: path.to_path_buf(),
            source,
        })
    }

    fn display(&mut self, buffer: &PixelBuffer) -> Result<()> {
        let path = self.next_preview_path();
        self.encode(buffer, &path)?;
        info!(path = %path.display(), "preview written");
        Ok(())
    }
}

/// Re-encode `images` as RGBA PNGs into `dir`, keeping their file stems.
/// Returns the written paths in input order.
pub fn convert_to_rgba<I: ImageIo, P: AsRef<Path>>(
    io: &mut I,
    images: &[P],
    dir: &Path,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(images.len());
    for image in images {
        let image = image.as_ref();
        let buffer = io.decode(image)?;
        let stem = image.file_stem().unwrap_or(image.as_os_str());
        let out = dir.join(format!("{}.png", stem.to_string_lossy()));
        io.encode(&buffer, &out)?;
        written.push(out);
    }
    Ok(written)
}

#[cfg(test)]
pub(crate) mod memory {
    use std::collections::HashMap;

    use super::*;

    /// In-memory [`ImageIo`] that remembers every encode and display.
    #[derive(Debug, Default)]
    pub struct MemoryIo {
        pub files: HashMap<PathBuf, PixelBuffer>,
        pub encoded: Vec<PathBuf>,
        pub shown: Vec<PixelBuffer>,
    }

    impl MemoryIo {
        pub fn with(mut self, path: &str, buffer: PixelBuffer) -> Self {
            self.files.insert(PathBuf::from(path), buffer);
            self
        }
    }

    impl ImageIo for MemoryIo {
        fn decode(&self, path: &Path) -> Result<PixelBuffer> {
            self.files
                .get(path)
                .cloned()
                .ok_or_else(|| MergeError::Decode {
                    path: path.to_path_buf(),
                    source: ImageError::IoError(std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "no such image",
                    )),
                })
        }

        fn encode(&mut self, buffer: &PixelBuffer, path: &Path) -> Result<()> {
            self.files.insert(path.to_path_buf(), buffer.clone());
            self.encoded.push(path.to_path_buf());
            Ok(())
        }

        fn display(&mut self, buffer: &PixelBuffer) -> Result<()> {
            self.shown.push(buffer.clone());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::memory::MemoryIo;
    use super::*;
    use crate::process::{DEFAULT_TOLERANCE, within_tolerance};
    use image::Rgba;

    #[test]
    fn fs_round_trip_through_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.png");
        let buffer = PixelBuffer::from_pixel(6, 4, Rgba([12, 34, 56, 200]));

        let mut io = FsImageIo::default();
        io.encode(&buffer, &path).unwrap();
        assert_eq!(io.decode(&path).unwrap(), buffer);
    }

    #[test]
    fn fs_round_trip_through_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ImFuse.jpg");
        let color = Rgba([10, 20, 30, 255]);

        let mut io = FsImageIo::default();
        io.encode(&PixelBuffer::from_pixel(8, 8, color), &path)
            .unwrap();
        let decoded = io.decode(&path).unwrap();
        assert_eq!(decoded.dimensions(), (8, 8));
        for y in 0..8 {
            for x in 0..8 {
                let p = decoded.get(x, y).unwrap();
                assert!(
                    within_tolerance(&p, &color, DEFAULT_TOLERANCE),
                    "({x}, {y}) decoded as {p:?}"
                );
            }
        }
    }

    #[test]
    fn fs_encode_unknown_extension_is_encode_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = FsImageIo::default()
            .encode(
                &PixelBuffer::from_pixel(1, 1, Rgba([0, 0, 0, 255])),
                &dir.path().join("out.nope"),
            )
            .unwrap_err();
        assert!(matches!(err, MergeError::Encode { .. }));
    }

    #[test]
    fn fs_decode_missing_file_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = FsImageIo::default()
            .decode(&dir.path().join("missing.png"))
            .unwrap_err();
        assert!(matches!(err, MergeError::Decode { .. }));
    }

    #[test]
    fn fs_display_writes_into_preview_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut io = FsImageIo::with_preview_dir(dir.path());
        assert_eq!(io.preview_dir(), Some(dir.path()));
        io.display(&PixelBuffer::from_pixel(2, 2, Rgba([0, 0, 0, 255])))
            .unwrap();
        let count = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(count, 1);
    }

    #[test]
    fn convert_keeps_stems_and_forces_png() {
        let mut io = MemoryIo::default()
            .with("in/a.jpg", PixelBuffer::from_pixel(1, 1, Rgba([1, 1, 1, 255])))
            .with("in/b.bmp", PixelBuffer::from_pixel(1, 1, Rgba([2, 2, 2, 255])));

        let written = convert_to_rgba(&mut io, &["in/a.jpg", "in/b.bmp"], Path::new("out")).unwrap();
        assert_eq!(
            written,
            vec![PathBuf::from("out/a.png"), PathBuf::from("out/b.png")]
        );
        assert_eq!(io.encoded, written);
    }
}
