//! Image reference resolution
//!
//! The content store hands out images as opaque references such as
//! `image-Tb9Ew8CXIwaY6R1kjMvI0uRR-2000x3000-jpg`. This module turns
//! them into CDN URLs without any network traffic.

use serde::Deserialize;

use crate::config::SanityConfig;

/// An image field as stored in a document
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ImageRef {
    #[serde(default)]
    pub asset: Option<ImageAsset>,
    #[serde(default)]
    pub crop: Option<ImageCrop>,
    #[serde(default)]
    pub alt: Option<String>,
}

impl ImageRef {
    /// Build a reference from a raw asset id
    pub fn from_ref(reference: &str) -> Self {
        Self {
            asset: Some(ImageAsset {
                reference: Some(reference.to_string()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}

/// The asset part of an image: either a reference or an expanded asset
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ImageAsset {
    #[serde(rename = "_ref", default)]
    pub reference: Option<String>,
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl ImageAsset {
    fn asset_id(&self) -> Option<&str> {
        self.reference.as_deref().or(self.id.as_deref())
    }
}

/// Crop rectangle, each side as a fraction of the full image
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq)]
pub struct ImageCrop {
    #[serde(default)]
    pub top: f64,
    #[serde(default)]
    pub bottom: f64,
    #[serde(default)]
    pub left: f64,
    #[serde(default)]
    pub right: f64,
}

/// Parsed `image-<id>-<w>x<h>-<format>` asset id
#[derive(Debug, Clone, PartialEq, Eq)]
struct AssetId<'a> {
    id: &'a str,
    width: u32,
    height: u32,
    format: &'a str,
}

fn parse_asset_id(reference: &str) -> Option<AssetId<'_>> {
    let mut parts = reference.split('-');
    if parts.next()? != "image" {
        return None;
    }
    let id = parts.next()?;
    let dimensions = parts.next()?;
    let format = parts.next()?;
    if parts.next().is_some() || id.is_empty() || format.is_empty() {
        return None;
    }

    let (width, height) = dimensions.split_once('x')?;
    Some(AssetId {
        id,
        width: width.parse().ok()?,
        height: height.parse().ok()?,
        format,
    })
}

/// Resolves image references against one project and dataset
#[derive(Debug, Clone)]
pub struct ImageResolver {
    host: String,
    project_id: String,
    dataset: String,
}

impl ImageResolver {
    pub fn new(config: &SanityConfig) -> Self {
        Self {
            host: config.image_host.trim_end_matches('/').to_string(),
            project_id: config.project_id.clone(),
            dataset: config.dataset.clone(),
        }
    }

    /// Plain URL for an image, or `None` when the reference is malformed
    pub fn resolve(&self, image: &ImageRef) -> Option<String> {
        self.image(image).url()
    }

    /// Start building a URL with transformation parameters
    pub fn image<'a>(&'a self, image: &'a ImageRef) -> ImageUrlBuilder<'a> {
        ImageUrlBuilder {
            resolver: self,
            image,
            width: None,
            height: None,
            format: None,
            quality: None,
            fit: None,
            auto_format: false,
        }
    }
}

/// URL builder for a single image
#[derive(Debug, Clone)]
pub struct ImageUrlBuilder<'a> {
    resolver: &'a ImageResolver,
    image: &'a ImageRef,
    width: Option<u32>,
    height: Option<u32>,
    format: Option<String>,
    quality: Option<u8>,
    fit: Option<String>,
    auto_format: bool,
}

impl<'a> ImageUrlBuilder<'a> {
    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn height(mut self, height: u32) -> Self {
        self.height = Some(height);
        self
    }

    pub fn format(mut self, format: &str) -> Self {
        self.format = Some(format.to_string());
        self
    }

    pub fn quality(mut self, quality: u8) -> Self {
        self.quality = Some(quality.min(100));
        self
    }

    pub fn fit(mut self, fit: &str) -> Self {
        self.fit = Some(fit.to_string());
        self
    }

    pub fn auto_format(mut self) -> Self {
        self.auto_format = true;
        self
    }

    /// Render the final URL
    pub fn url(&self) -> Option<String> {
        let asset = self.image.asset.as_ref()?;

        let (base, rect) = match asset.asset_id().and_then(parse_asset_id) {
            Some(parsed) => {
                let base = format!(
                    "{}/images/{}/{}/{}-{}x{}.{}",
                    self.resolver.host,
                    self.resolver.project_id,
                    self.resolver.dataset,
                    parsed.id,
                    parsed.width,
                    parsed.height,
                    parsed.format
                );
                let rect = self
                    .image
                    .crop
                    .and_then(|crop| crop_rect(&crop, parsed.width, parsed.height));
                (base, rect)
            }
            None => (asset.url.clone()?, None),
        };

        let mut params = Vec::new();
        if let Some((left, top, width, height)) = rect {
            params.push(format!("rect={},{},{},{}", left, top, width, height));
        }
        if let Some(width) = self.width {
            params.push(format!("w={}", width));
        }
        if let Some(height) = self.height {
            params.push(format!("h={}", height));
        }
        if let Some(format) = &self.format {
            params.push(format!("fm={}", format));
        }
        if let Some(quality) = self.quality {
            params.push(format!("q={}", quality));
        }
        if let Some(fit) = &self.fit {
            params.push(format!("fit={}", fit));
        }
        if self.auto_format {
            params.push("auto=format".to_string());
        }

        if params.is_empty() {
            Some(base)
        } else {
            let separator = if base.contains('?') { '&' } else { '?' };
            Some(format!("{}{}{}", base, separator, params.join("&")))
        }
    }
}

/// Pixel rectangle for a crop, `None` when it covers the whole image
fn crop_rect(crop: &ImageCrop, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
    let w = f64::from(width);
    let h = f64::from(height);

    let left = (crop.left * w).round();
    let top = (crop.top * h).round();
    let rect_width = (w - crop.right * w - crop.left * w).round();
    let rect_height = (h - crop.bottom * h - crop.top * h).round();

    if rect_width <= 0.0 || rect_height <= 0.0 {
        return None;
    }

    let rect = (
        left as u32,
        top as u32,
        rect_width as u32,
        rect_height as u32,
    );
    if rect == (0, 0, width, height) {
        None
    } else {
        Some(rect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> ImageResolver {
        ImageResolver::new(&SanityConfig {
            project_id: "zp7mbokg".to_string(),
            ..Default::default()
        })
    }

    const REF: &str = "image-Tb9Ew8CXIwaY6R1kjMvI0uRR-2000x3000-jpg";

    #[test]
    fn test_parse_asset_id() {
        let parsed = parse_asset_id(REF).unwrap();
        assert_eq!(parsed.id, "Tb9Ew8CXIwaY6R1kjMvI0uRR");
        assert_eq!(parsed.width, 2000);
        assert_eq!(parsed.height, 3000);
        assert_eq!(parsed.format, "jpg");

        assert!(parse_asset_id("file-abc-pdf").is_none());
        assert!(parse_asset_id("image-abc-20x-png").is_none());
        assert!(parse_asset_id("image-abc").is_none());
    }

    #[test]
    fn test_resolve_reference() {
        let url = resolver().resolve(&ImageRef::from_ref(REF)).unwrap();
        assert_eq!(
            url,
            "https://cdn.sanity.io/images/zp7mbokg/production/Tb9Ew8CXIwaY6R1kjMvI0uRR-2000x3000.jpg"
        );
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let resolver = resolver();
        let image = ImageRef::from_ref(REF);
        assert_eq!(resolver.resolve(&image), resolver.resolve(&image.clone()));
    }

    #[test]
    fn test_resolve_expanded_asset_url() {
        let image: ImageRef = serde_json::from_str(
            r#"{"asset": {"url": "https://cdn.example.com/a.png"}}"#,
        )
        .unwrap();
        assert_eq!(
            resolver().resolve(&image).as_deref(),
            Some("https://cdn.example.com/a.png")
        );
    }

    #[test]
    fn test_resolve_malformed() {
        assert!(resolver().resolve(&ImageRef::default()).is_none());
        assert!(resolver().resolve(&ImageRef::from_ref("nonsense")).is_none());
    }

    #[test]
    fn test_builder_params() {
        let resolver = resolver();
        let image = ImageRef::from_ref(REF);
        let url = resolver
            .image(&image)
            .width(400)
            .height(300)
            .fit("crop")
            .auto_format()
            .url()
            .unwrap();
        assert!(url.ends_with("-2000x3000.jpg?w=400&h=300&fit=crop&auto=format"));
    }

    #[test]
    fn test_crop_rect() {
        let mut image = ImageRef::from_ref(REF);
        image.crop = Some(ImageCrop {
            top: 0.1,
            bottom: 0.1,
            left: 0.25,
            right: 0.25,
        });
        let url = resolver().resolve(&image).unwrap();
        assert!(url.ends_with("?rect=500,300,1000,2400"), "{}", url);

        image.crop = Some(ImageCrop::default());
        let url = resolver().resolve(&image).unwrap();
        assert!(!url.contains("rect="));
    }
}
