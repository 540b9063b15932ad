//! Background texture decoding
//!
//! Files are decoded on a worker thread and handed back over a channel. The
//! render loop drains the channel without blocking at the start of each frame.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;

use image::{imageops::FilterType, RgbaImage};

use super::texture_library::TextureId;
use crate::error::AssetError;

/// One level of a mip chain, tightly packed RGBA8
#[derive(Debug, Clone, PartialEq)]
pub struct MipLevel {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Decoded RGBA8 image with its full mip chain, ready for upload
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    pub levels: Vec<MipLevel>,
}

impl ImageData {
    /// Decodes a JPEG or PNG file
    pub fn from_file(path: &Path) -> Result<Self, AssetError> {
        let image = image::open(path).map_err(|source| AssetError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_rgba(image.to_rgba8()))
    }

    /// Builds the mip chain down to 1x1 by repeated halving
    pub fn from_rgba(image: RgbaImage) -> Self {
        let mut levels = Vec::new();
        let mut current = image;
        loop {
            let (width, height) = current.dimensions();
            if width <= 1 && height <= 1 {
                levels.push(MipLevel {
                    width,
                    height,
                    pixels: current.into_raw(),
                });
                break;
            }
            let next = image::imageops::resize(
                &current,
                (width / 2).max(1),
                (height / 2).max(1),
                FilterType::Triangle,
            );
            levels.push(MipLevel {
                width,
                height,
                pixels: current.into_raw(),
            });
            current = next;
        }
        Self { levels }
    }

    /// Single-texel image
    pub fn solid_color(rgba: [u8; 4]) -> Self {
        Self {
            levels: vec![MipLevel {
                width: 1,
                height: 1,
                pixels: rgba.to_vec(),
            }],
        }
    }

    pub fn width(&self) -> u32 {
        self.levels.first().map_or(0, |l| l.width)
    }

    pub fn height(&self) -> u32 {
        self.levels.first().map_or(0, |l| l.height)
    }

    pub fn mip_level_count(&self) -> u32 {
        self.levels.len() as u32
    }
}

/// Result of one texture request
#[derive(Debug)]
pub struct LoadedTexture {
    pub id: TextureId,
    pub path: PathBuf,
    pub result: Result<ImageData, AssetError>,
}

/// Decodes requested files off the render thread
pub struct TextureLoader {
    sender: Sender<LoadedTexture>,
    receiver: Receiver<LoadedTexture>,
    pending: usize,
}

impl TextureLoader {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver,
            pending: 0,
        }
    }

    /// Queues files for decoding on a worker thread
    ///
    /// Results arrive in request order but no caller should rely on that.
    pub fn request_all(&mut self, requests: Vec<(TextureId, PathBuf)>) {
        if requests.is_empty() {
            return;
        }
        let count = requests.len();
        let sender = self.sender.clone();

        let spawned = thread::Builder::new()
            .name("texture-loader".to_string())
            .spawn(move || {
                for (id, path) in requests {
                    let result = ImageData::from_file(&path);
                    // Receiver gone means the app is shutting down
                    if sender.send(LoadedTexture { id, path, result }).is_err() {
                        break;
                    }
                }
            });

        match spawned {
            Ok(_) => self.pending += count,
            Err(err) => log::error!("{}", AssetError::Worker(err)),
        }
    }

    /// Drains every result that is ready without waiting
    pub fn poll(&mut self) -> Vec<LoadedTexture> {
        let mut ready = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(loaded) => {
                    self.pending = self.pending.saturating_sub(1);
                    ready.push(loaded);
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        ready
    }

    /// Requests not yet delivered by [`TextureLoader::poll`]
    pub fn pending(&self) -> usize {
        self.pending
    }
}

impl Default for TextureLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn wait_for(loader: &mut TextureLoader, count: usize) -> Vec<LoadedTexture> {
        let deadline = Instant::now() + Duration::from_secs(10);
        let mut results = Vec::new();
        while results.len() < count && Instant::now() < deadline {
            results.extend(loader.poll());
            thread::sleep(Duration::from_millis(5));
        }
        results
    }

    #[test]
    fn mip_chain_halves_to_one_texel() {
        let image = RgbaImage::from_pixel(4, 2, image::Rgba([10, 20, 30, 255]));
        let data = ImageData::from_rgba(image);
        let sizes: Vec<_> = data.levels.iter().map(|l| (l.width, l.height)).collect();
        assert_eq!(sizes, vec![(4, 2), (2, 1), (1, 1)]);
        assert!(data.levels.iter().all(|l| l.pixels.len() == (l.width * l.height * 4) as usize));
        assert_eq!(data.levels[2].pixels, vec![10, 20, 30, 255]);
    }

    #[test]
    fn solid_color_is_single_level() {
        let data = ImageData::solid_color([128, 128, 255, 255]);
        assert_eq!((data.width(), data.height(), data.mip_level_count()), (1, 1, 1));
    }

    #[test]
    fn missing_file_reports_an_error() {
        let mut loader = TextureLoader::new();
        loader.request_all(vec![(TextureId(3), PathBuf::from("does/not/exist.jpg"))]);
        assert_eq!(loader.pending(), 1);

        let results = wait_for(&mut loader, 1);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, TextureId(3));
        assert!(matches!(results[0].result, Err(AssetError::Decode { .. })));
        assert_eq!(loader.pending(), 0);
    }

    #[test]
    fn decodes_png_from_disk() {
        let path = std::env::temp_dir().join(format!("haunted-loader-{}.png", std::process::id()));
        RgbaImage::from_pixel(8, 8, image::Rgba([255, 0, 0, 255]))
            .save(&path)
            .unwrap();

        let mut loader = TextureLoader::new();
        loader.request_all(vec![(TextureId(0), path.clone())]);
        let results = wait_for(&mut loader, 1);
        let _ = std::fs::remove_file(&path);

        let data = results[0].result.as_ref().unwrap();
        assert_eq!((data.width(), data.height()), (8, 8));
        assert_eq!(data.mip_level_count(), 4);
        assert_eq!(&data.levels[0].pixels[..4], &[255, 0, 0, 255]);
    }

    #[test]
    fn poll_never_blocks_when_idle() {
        let mut loader = TextureLoader::new();
        assert!(loader.poll().is_empty());
    }
}
