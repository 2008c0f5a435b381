//! Asset barrier: wait until every image under a root has loaded or failed.

use crate::error::{Error, Result};
use crate::view::NodeId;
use async_trait::async_trait;
use futures::future::join_all;
use image::DynamicImage;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Origin used to resolve root-relative image paths when none is configured.
pub const DEFAULT_ORIGIN: &str = "http://localhost:3000";

/// Bytes returned by an [`AssetLoader`].
#[derive(Debug, Clone)]
pub struct FetchedAsset {
    /// Raw encoded image
    pub bytes: Vec<u8>,
    /// Whether the asset came from another origin
    pub cross_origin: bool,
    /// Whether the response allowed cross-origin reads
    pub cors_allowed: bool,
}

impl FetchedAsset {
    /// A same-origin asset.
    pub fn local(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            cross_origin: false,
            cors_allowed: true,
        }
    }
}

/// Source of image bytes.
#[async_trait]
pub trait AssetLoader: Send + Sync {
    /// Fetch the asset at an absolute URL.
    async fn load(&self, url: &str) -> Result<FetchedAsset>;
}

/// Outcome of loading one image.
#[derive(Debug, Clone)]
pub enum AssetStatus {
    /// Decoded and safe to draw
    Loaded(Arc<DynamicImage>),
    /// Decoded, but drawing it taints the capture
    Tainted(Arc<DynamicImage>),
    /// Could not be fetched or decoded
    Failed(String),
}

impl AssetStatus {
    /// Whether the image can be drawn without side effects.
    pub fn is_loaded(&self) -> bool {
        matches!(self, AssetStatus::Loaded(_))
    }
}

/// Settled images keyed by their `src` as written in the tree.
#[derive(Debug, Clone, Default)]
pub struct AssetSet {
    entries: HashMap<String, AssetStatus>,
}

impl AssetSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an outcome.
    pub fn insert(&mut self, src: impl Into<String>, status: AssetStatus) {
        self.entries.insert(src.into(), status);
    }

    /// Outcome for `src`.
    pub fn get(&self, src: &str) -> Option<&AssetStatus> {
        self.entries.get(src)
    }

    /// Number of settled images.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no image was settled.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of images that loaded cleanly.
    pub fn loaded(&self) -> usize {
        self.entries.values().filter(|s| s.is_loaded()).count()
    }

    /// Number of images that failed.
    pub fn failed(&self) -> usize {
        self.entries
            .values()
            .filter(|s| matches!(s, AssetStatus::Failed(_)))
            .count()
    }
}

/// Resolve an image `src` to an absolute URL.
///
/// Root-relative paths are joined to `origin`, protocol-relative paths get
/// the origin's scheme, everything else is returned unchanged.
pub fn resolve_url(src: &str, origin: &str) -> String {
    let origin = origin.trim_end_matches('/');
    if let Some(rest) = src.strip_prefix("//") {
        let scheme = origin.split_once("://").map(|(s, _)| s).unwrap_or("https");
        format!("{}://{}", scheme, rest)
    } else if src.starts_with('/') {
        format!("{}{}", origin, src)
    } else {
        src.to_string()
    }
}

/// Origin (`scheme://host[:port]`) of an absolute URL.
pub fn origin_of(url: &str) -> Option<&str> {
    let (scheme, rest) = url.split_once("://")?;
    let host_end = rest.find('/').unwrap_or(rest.len());
    Some(&url[..scheme.len() + 3 + host_end])
}

/// Waits for a set of images to settle.
pub struct AssetBarrier {
    loader: Arc<dyn AssetLoader>,
    origin: String,
    use_cors: bool,
}

impl AssetBarrier {
    /// Create a barrier resolving root-relative paths against `origin`.
    pub fn new(loader: Arc<dyn AssetLoader>, origin: impl Into<String>) -> Self {
        Self {
            loader,
            origin: origin.into(),
            use_cors: true,
        }
    }

    /// Request cross-origin images in CORS mode.
    ///
    /// Without CORS, cross-origin images still load but are marked
    /// [`AssetStatus::Tainted`].
    pub fn with_cors(mut self, use_cors: bool) -> Self {
        self.use_cors = use_cors;
        self
    }

    /// Load every image and resolve once each has loaded or failed.
    ///
    /// Individual failures are logged and recorded, never returned.
    pub async fn settle(&self, images: &[(NodeId, String)]) -> AssetSet {
        let mut unique: Vec<&str> = Vec::new();
        for (_, src) in images {
            if !unique.contains(&src.as_str()) {
                unique.push(src);
            }
        }

        let outcomes = join_all(unique.iter().map(|src| self.settle_one(src))).await;

        let mut set = AssetSet::new();
        for (src, status) in unique.into_iter().zip(outcomes) {
            set.insert(src, status);
        }
        log::debug!(
            "Asset barrier settled {} image(s), {} failed",
            set.len(),
            set.failed()
        );
        set
    }

    async fn settle_one(&self, src: &str) -> AssetStatus {
        let url = resolve_url(src, &self.origin);
        match self.fetch(&url).await {
            Ok(status) => status,
            Err(e) => {
                log::warn!("Image failed to load, continuing without it: {}", e);
                AssetStatus::Failed(e.to_string())
            }
        }
    }

    async fn fetch(&self, url: &str) -> Result<AssetStatus> {
        let fetched = self.loader.load(url).await?;
        if fetched.cross_origin && self.use_cors && !fetched.cors_allowed {
            return Err(Error::Asset {
                url: url.to_string(),
                reason: "blocked by CORS policy".to_string(),
            });
        }
        let image = image::load_from_memory(&fetched.bytes).map_err(|e| Error::Asset {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        let image = Arc::new(image);
        Ok(if fetched.cross_origin && !self.use_cors {
            AssetStatus::Tainted(image)
        } else {
            AssetStatus::Loaded(image)
        })
    }
}

/// Serves same-origin URLs from a local directory.
#[derive(Debug, Clone)]
pub struct FileAssetLoader {
    root: PathBuf,
    origin: String,
}

impl FileAssetLoader {
    /// Map `<origin>/<path>` to `<root>/<path>`.
    pub fn new(root: impl Into<PathBuf>, origin: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            origin: origin.into().trim_end_matches('/').to_string(),
        }
    }

    fn path_for(&self, url: &str) -> Result<PathBuf> {
        if let Some(path) = url.strip_prefix("file://") {
            return Ok(PathBuf::from(path));
        }
        let rel = url
            .strip_prefix(self.origin.as_str())
            .filter(|rest| rest.starts_with('/'))
            .ok_or_else(|| Error::Asset {
                url: url.to_string(),
                reason: "not served by the local asset directory".to_string(),
            })?;
        let rel = rel.split(['?', '#']).next().unwrap_or_default();
        if rel.split('/').any(|part| part == "..") {
            return Err(Error::Asset {
                url: url.to_string(),
                reason: "path escapes the asset directory".to_string(),
            });
        }
        Ok(self.root.join(rel.trim_start_matches('/')))
    }
}

#[async_trait]
impl AssetLoader for FileAssetLoader {
    async fn load(&self, url: &str) -> Result<FetchedAsset> {
        let path = self.path_for(url)?;
        let bytes = tokio::fs::read(&path).await.map_err(|e| Error::Asset {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(FetchedAsset::local(bytes))
    }
}

/// Fetches images over HTTP.
#[cfg(feature = "http")]
#[derive(Debug, Clone)]
pub struct HttpAssetLoader {
    client: reqwest::Client,
    origin: String,
}

#[cfg(feature = "http")]
impl HttpAssetLoader {
    /// Create a loader that treats `origin` as the page origin.
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            origin: origin.into().trim_end_matches('/').to_string(),
        }
    }
}

#[cfg(feature = "http")]
#[async_trait]
impl AssetLoader for HttpAssetLoader {
    async fn load(&self, url: &str) -> Result<FetchedAsset> {
        let asset_err = |reason: String| Error::Asset {
            url: url.to_string(),
            reason,
        };
        let response = self
            .client
            .get(url)
            .header("Origin", self.origin.as_str())
            .send()
            .await
            .map_err(|e| asset_err(e.to_string()))?;
        if !response.status().is_success() {
            return Err(asset_err(format!("HTTP {}", response.status())));
        }

        let cross_origin = origin_of(url) != Some(self.origin.as_str());
        let cors_allowed = response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok())
            .map(|v| v == "*" || v == self.origin)
            .unwrap_or(false);
        let bytes = response
            .bytes()
            .await
            .map_err(|e| asset_err(e.to_string()))?;

        Ok(FetchedAsset {
            bytes: bytes.to_vec(),
            cross_origin,
            cors_allowed,
        })
    }
}

/// Tries each loader in turn, returning the first success.
pub struct FallbackAssetLoader {
    loaders: Vec<Arc<dyn AssetLoader>>,
}

impl FallbackAssetLoader {
    /// Create from loaders in priority order.
    pub fn new(loaders: Vec<Arc<dyn AssetLoader>>) -> Self {
        Self { loaders }
    }
}

#[async_trait]
impl AssetLoader for FallbackAssetLoader {
    async fn load(&self, url: &str) -> Result<FetchedAsset> {
        let mut last = Error::Asset {
            url: url.to_string(),
            reason: "no asset loader configured".to_string(),
        };
        for loader in &self.loaders {
            match loader.load(url).await {
                Ok(asset) => return Ok(asset),
                Err(e) => last = e,
            }
        }
        Err(last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    pub(crate) fn png_bytes() -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([255, 0, 0, 255]));
        let mut out = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut out, image::ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    struct MapLoader(HashMap<String, FetchedAsset>);

    #[async_trait]
    impl AssetLoader for MapLoader {
        async fn load(&self, url: &str) -> Result<FetchedAsset> {
            self.0.get(url).cloned().ok_or_else(|| Error::Asset {
                url: url.to_string(),
                reason: "404".to_string(),
            })
        }
    }

    #[test]
    fn test_resolve_url() {
        assert_eq!(resolve_url("/me.png", "http://localhost:3000/"), "http://localhost:3000/me.png");
        assert_eq!(resolve_url("//cdn.example.com/a.png", "https://me.dev"), "https://cdn.example.com/a.png");
        assert_eq!(resolve_url("https://x.dev/a.png", "http://localhost:3000"), "https://x.dev/a.png");
        assert_eq!(origin_of("https://x.dev/a/b.png"), Some("https://x.dev"));
        assert_eq!(origin_of("relative.png"), None);
    }

    #[tokio::test]
    async fn test_barrier_records_failures() {
        let mut map = HashMap::new();
        map.insert("http://localhost:3000/ok.png".to_string(), FetchedAsset::local(png_bytes()));
        map.insert("http://localhost:3000/bad.png".to_string(), FetchedAsset::local(b"nope".to_vec()));
        let barrier = AssetBarrier::new(Arc::new(MapLoader(map)), DEFAULT_ORIGIN);

        let tree = crate::view::VisualTree::from_element(crate::view::Element::new("div"));
        let root = tree.root();
        let set = barrier
            .settle(&[
                (root, "/ok.png".to_string()),
                (root, "/bad.png".to_string()),
                (root, "/missing.png".to_string()),
                (root, "/ok.png".to_string()),
            ])
            .await;

        assert_eq!(set.len(), 3);
        assert_eq!(set.loaded(), 1);
        assert_eq!(set.failed(), 2);
    }

    #[tokio::test]
    async fn test_cross_origin_policy() {
        let url = "https://cdn.example.com/logo.png";
        let mut map = HashMap::new();
        map.insert(
            url.to_string(),
            FetchedAsset {
                bytes: png_bytes(),
                cross_origin: true,
                cors_allowed: false,
            },
        );
        let loader: Arc<dyn AssetLoader> = Arc::new(MapLoader(map));
        let tree = crate::view::VisualTree::from_element(crate::view::Element::new("div"));
        let images = [(tree.root(), url.to_string())];

        let cors = AssetBarrier::new(loader.clone(), DEFAULT_ORIGIN).settle(&images).await;
        assert!(matches!(cors.get(url), Some(AssetStatus::Failed(_))));

        let no_cors = AssetBarrier::new(loader, DEFAULT_ORIGIN)
            .with_cors(false)
            .settle(&images)
            .await;
        assert!(matches!(no_cors.get(url), Some(AssetStatus::Tainted(_))));
    }

    #[tokio::test]
    async fn test_file_loader() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("me.png"), png_bytes()).unwrap();
        let loader = FileAssetLoader::new(dir.path(), DEFAULT_ORIGIN);

        assert!(loader.load("http://localhost:3000/me.png").await.is_ok());
        assert!(loader.load("http://localhost:3000/../secret.png").await.is_err());
        assert!(loader.load("https://elsewhere.dev/me.png").await.is_err());
    }
}
