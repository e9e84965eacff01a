//! Asynchronous font and image loading with per-slot staleness tokens.
//!
//! Requests go out with a `RequestToken`; completions come back through
//! `AssetProvider::poll` on the render thread. A completion is applied only if
//! its token is still the newest one issued for its slot.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::error::AssetLoadError;
use crate::style::StyleTarget;
use crate::text::{FontCatalog, FontKey, LabelFont};

/// Straight-alpha RGBA8 pixels.
#[derive(Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DecodedImage({}x{})", self.width, self.height)
    }
}

impl DecodedImage {
    /// Decodes any format the `image` crate was built with.
    pub fn decode(bytes: &[u8]) -> Result<Self, AssetLoadError> {
        let rgba = image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(Self {
            width,
            height,
            pixels: rgba.into_raw(),
        })
    }

    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = rgba
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }
}

/// Where an image comes from.
#[derive(Clone, PartialEq, Eq)]
pub enum ImageSource {
    Bytes(Vec<u8>),
    Path(PathBuf),
}

impl fmt::Debug for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageSource::Bytes(b) => write!(f, "Bytes({} bytes)", b.len()),
            ImageSource::Path(p) => write!(f, "Path({})", p.display()),
        }
    }
}

impl ImageSource {
    /// Reads (if needed) and decodes. Blocking.
    pub fn load(self) -> Result<DecodedImage, AssetLoadError> {
        match self {
            ImageSource::Bytes(bytes) => DecodedImage::decode(&bytes),
            ImageSource::Path(path) => {
                let bytes = std::fs::read(&path)
                    .map_err(|source| AssetLoadError::Io { path, source })?;
                DecodedImage::decode(&bytes)
            }
        }
    }
}

/// What a request is for. Each slot has its own token sequence.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum RequestSlot {
    Font,
    Texture(StyleTarget),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct RequestToken(u64);

/// Newest token per slot.
#[derive(Debug, Default)]
pub struct RequestTokens {
    font: u64,
    textures: [u64; 3],
}

impl RequestTokens {
    fn counter(&mut self, slot: RequestSlot) -> &mut u64 {
        match slot {
            RequestSlot::Font => &mut self.font,
            RequestSlot::Texture(target) => &mut self.textures[target.index()],
        }
    }

    fn current(&self, slot: RequestSlot) -> u64 {
        match slot {
            RequestSlot::Font => self.font,
            RequestSlot::Texture(target) => self.textures[target.index()],
        }
    }

    /// Issues a token that supersedes every earlier one for `slot`.
    pub fn issue(&mut self, slot: RequestSlot) -> RequestToken {
        let counter = self.counter(slot);
        *counter += 1;
        RequestToken(*counter)
    }

    /// Makes every outstanding request for `slot` stale.
    pub fn invalidate(&mut self, slot: RequestSlot) {
        *self.counter(slot) += 1;
    }

    pub fn is_current(&self, slot: RequestSlot, token: RequestToken) -> bool {
        self.current(slot) == token.0
    }
}

#[derive(Debug)]
pub enum AssetPayload {
    Font(Arc<dyn LabelFont>),
    Image(DecodedImage),
}

#[derive(Debug)]
pub struct AssetCompletion {
    pub slot: RequestSlot,
    pub token: RequestToken,
    pub result: Result<AssetPayload, AssetLoadError>,
}

/// Resolves fonts and images without blocking the caller.
pub trait AssetProvider {
    fn request_font(&mut self, key: FontKey, token: RequestToken);
    fn request_image(&mut self, target: StyleTarget, source: ImageSource, token: RequestToken);
    /// Completed requests since the last call, in completion order.
    fn poll(&mut self) -> Vec<AssetCompletion>;
}

enum Job {
    Font {
        key: FontKey,
        token: RequestToken,
    },
    Image {
        target: StyleTarget,
        source: ImageSource,
        token: RequestToken,
    },
}

impl Job {
    fn slot_and_token(&self) -> (RequestSlot, RequestToken) {
        match self {
            Job::Font { token, .. } => (RequestSlot::Font, *token),
            Job::Image { target, token, .. } => (RequestSlot::Texture(*target), *token),
        }
    }

    fn run(self, catalog: &FontCatalog) -> AssetCompletion {
        let (slot, token) = self.slot_and_token();
        let result = match self {
            Job::Font { key, .. } => catalog
                .load(key)
                .map(|font| AssetPayload::Font(Arc::new(font))),
            Job::Image { source, .. } => source.load().map(AssetPayload::Image),
        };
        AssetCompletion {
            slot,
            token,
            result,
        }
    }
}

/// Loads assets on one background thread.
pub struct ThreadedLoader {
    jobs: Option<Sender<Job>>,
    done: Receiver<AssetCompletion>,
    /// Completions produced locally (worker already gone).
    failed: Vec<AssetCompletion>,
    worker: Option<JoinHandle<()>>,
}

impl ThreadedLoader {
    pub fn spawn(catalog: FontCatalog) -> Result<Self, AssetLoadError> {
        let (job_tx, job_rx) = mpsc::channel::<Job>();
        let (done_tx, done_rx) = mpsc::channel::<AssetCompletion>();

        let worker = thread::Builder::new()
            .name("horae-assets".to_string())
            .spawn(move || {
                for job in job_rx {
                    if done_tx.send(job.run(&catalog)).is_err() {
                        break;
                    }
                }
                log::debug!("asset worker exiting");
            })
            .map_err(AssetLoadError::Spawn)?;

        Ok(Self {
            jobs: Some(job_tx),
            done: done_rx,
            failed: Vec::new(),
            worker: Some(worker),
        })
    }

    fn submit(&mut self, job: Job) {
        let Some(jobs) = self.jobs.as_ref() else {
            return self.fail(job);
        };
        if let Err(mpsc::SendError(job)) = jobs.send(job) {
            self.fail(job);
        }
    }

    fn fail(&mut self, job: Job) {
        let (slot, token) = job.slot_and_token();
        self.failed.push(AssetCompletion {
            slot,
            token,
            result: Err(AssetLoadError::WorkerGone),
        });
    }
}

impl AssetProvider for ThreadedLoader {
    fn request_font(&mut self, key: FontKey, token: RequestToken) {
        self.submit(Job::Font { key, token });
    }

    fn request_image(&mut self, target: StyleTarget, source: ImageSource, token: RequestToken) {
        self.submit(Job::Image {
            target,
            source,
            token,
        });
    }

    fn poll(&mut self) -> Vec<AssetCompletion> {
        let mut out = std::mem::take(&mut self.failed);
        out.extend(self.done.try_iter());
        out
    }
}

impl Drop for ThreadedLoader {
    fn drop(&mut self) {
        // Closing the job channel ends the worker loop.
        self.jobs.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::warn!("asset worker panicked");
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Records requests; completions are pushed by the test.
    #[derive(Debug, Default)]
    pub(crate) struct ManualLoader {
        pub fonts: Vec<(FontKey, RequestToken)>,
        pub images: Vec<(StyleTarget, ImageSource, RequestToken)>,
        pending: Vec<AssetCompletion>,
    }

    impl ManualLoader {
        pub(crate) fn complete(&mut self, completion: AssetCompletion) {
            self.pending.push(completion);
        }

        pub(crate) fn last_font_token(&self) -> Option<RequestToken> {
            self.fonts.last().map(|(_, t)| *t)
        }

        pub(crate) fn last_image_token(&self, target: StyleTarget) -> Option<RequestToken> {
            self.images
                .iter()
                .rev()
                .find(|(t, _, _)| *t == target)
                .map(|(_, _, token)| *token)
        }
    }

    impl AssetProvider for ManualLoader {
        fn request_font(&mut self, key: FontKey, token: RequestToken) {
            self.fonts.push((key, token));
        }

        fn request_image(&mut self, target: StyleTarget, source: ImageSource, token: RequestToken) {
            self.images.push((target, source, token));
        }

        fn poll(&mut self) -> Vec<AssetCompletion> {
            std::mem::take(&mut self.pending)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::time::{Duration, Instant};

    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn wait_for(loader: &mut ThreadedLoader, n: usize) -> Vec<AssetCompletion> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut got = Vec::new();
        while got.len() < n && Instant::now() < deadline {
            got.extend(loader.poll());
            std::thread::sleep(Duration::from_millis(5));
        }
        got
    }

    #[test]
    fn tokens_supersede_per_slot() {
        let mut tokens = RequestTokens::default();
        let font_a = tokens.issue(RequestSlot::Font);
        let tex = tokens.issue(RequestSlot::Texture(StyleTarget::Time));
        let font_b = tokens.issue(RequestSlot::Font);

        assert!(!tokens.is_current(RequestSlot::Font, font_a));
        assert!(tokens.is_current(RequestSlot::Font, font_b));
        assert!(tokens.is_current(RequestSlot::Texture(StyleTarget::Time), tex));
        assert!(!tokens.is_current(RequestSlot::Texture(StyleTarget::Date), tex));
    }

    #[test]
    fn invalidate_makes_outstanding_requests_stale() {
        let mut tokens = RequestTokens::default();
        let slot = RequestSlot::Texture(StyleTarget::Background);
        let t = tokens.issue(slot);
        tokens.invalidate(slot);
        assert!(!tokens.is_current(slot, t));
    }

    #[test]
    fn decodes_png() {
        let img = DecodedImage::decode(&png_bytes(3, 2)).unwrap();
        assert_eq!((img.width, img.height), (3, 2));
        assert_eq!(img.pixels.len(), 24);
        assert_eq!(&img.pixels[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn garbage_is_a_decode_error() {
        assert!(matches!(
            DecodedImage::decode(b"not an image"),
            Err(AssetLoadError::Decode(_))
        ));
    }

    #[test]
    fn solid_fills_every_pixel() {
        let img = DecodedImage::solid(2, 3, [1, 2, 3, 4]);
        assert_eq!(img.pixels.len(), 24);
        assert!(img.pixels.chunks(4).all(|p| p == [1, 2, 3, 4]));
    }

    #[test]
    fn threaded_loader_reports_results_with_tokens() {
        let mut loader = ThreadedLoader::spawn(FontCatalog::new()).unwrap();
        let mut tokens = RequestTokens::default();
        let image_token = tokens.issue(RequestSlot::Texture(StyleTarget::Date));
        let font_token = tokens.issue(RequestSlot::Font);

        loader.request_image(StyleTarget::Date, ImageSource::Bytes(png_bytes(4, 4)), image_token);
        loader.request_font(FontKey::Alt2, font_token);

        let done = wait_for(&mut loader, 2);
        assert_eq!(done.len(), 2);

        let image = done
            .iter()
            .find(|c| c.slot == RequestSlot::Texture(StyleTarget::Date))
            .unwrap();
        assert_eq!(image.token, image_token);
        assert!(matches!(&image.result, Ok(AssetPayload::Image(img)) if img.width == 4));

        let font = done.iter().find(|c| c.slot == RequestSlot::Font).unwrap();
        assert!(matches!(
            font.result,
            Err(AssetLoadError::UnknownFont(FontKey::Alt2))
        ));
    }

    #[test]
    fn missing_image_path_is_an_io_error() {
        let result = ImageSource::Path(PathBuf::from("/nonexistent/horae.png")).load();
        assert!(matches!(result, Err(AssetLoadError::Io { .. })));
    }
}
