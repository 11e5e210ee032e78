//! Sanity content backend: query client and image URLs

mod client;
mod image;

pub use client::{ClientError, MutationOutcome, MutationResult, SanityClient};
pub use image::{ImageAsset, ImageCrop, ImageRef, ImageResolver, ImageUrlBuilder};
