//! Post, Author and Comment records as returned by the content store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::portable_text::Block;
use crate::sanity::ImageRef;

/// Projections return `null` for absent fields; treat that like a missing key
fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// URL slug wrapper (`{ "current": "my-post" }`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slug {
    #[serde(default, deserialize_with = "null_default")]
    pub current: String,
}

impl Slug {
    pub fn new(current: &str) -> Self {
        Self {
            current: current.to_string(),
        }
    }
}

/// A reference to another document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(rename = "_type", default = "reference_type")]
    pub kind: String,
    #[serde(rename = "_ref")]
    pub target: String,
}

fn reference_type() -> String {
    "reference".to_string()
}

impl Reference {
    pub fn to(target: &str) -> Self {
        Self {
            kind: reference_type(),
            target: target.to_string(),
        }
    }
}

/// Dereferenced author as embedded in a post (`author->{ name, image, slug }`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostAuthor {
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(default)]
    pub image: Option<ImageRef>,
    #[serde(default)]
    pub slug: Option<Slug>,
}

/// A full blog post
#[derive(Debug, Clone, Deserialize)]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(rename = "_createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "null_default")]
    pub title: String,

    #[serde(default, deserialize_with = "null_default")]
    pub description: String,

    #[serde(default)]
    pub author: Option<PostAuthor>,

    #[serde(rename = "mainImage", default)]
    pub main_image: Option<ImageRef>,

    #[serde(default, deserialize_with = "null_default")]
    pub slug: Slug,

    /// Rich-text body
    #[serde(default, deserialize_with = "null_default")]
    pub body: Vec<Block>,

    #[serde(default, deserialize_with = "null_default")]
    pub comments: Vec<Comment>,
}

impl Post {
    /// Comments that passed moderation
    pub fn approved_comments(&self) -> impl Iterator<Item = &Comment> {
        self.comments.iter().filter(|c| c.approved)
    }
}

/// Post projection used by the listing and author pages
#[derive(Debug, Clone, Deserialize)]
pub struct PostSummary {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(rename = "_createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "null_default")]
    pub title: String,

    #[serde(default, deserialize_with = "null_default")]
    pub description: String,

    #[serde(default)]
    pub author: Option<PostAuthor>,

    #[serde(rename = "mainImage", default)]
    pub main_image: Option<ImageRef>,

    #[serde(default, deserialize_with = "null_default")]
    pub slug: Slug,
}

/// A post author
#[derive(Debug, Clone, Deserialize)]
pub struct Author {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(default, deserialize_with = "null_default")]
    pub name: String,

    #[serde(default, deserialize_with = "null_default")]
    pub slug: Slug,

    #[serde(default)]
    pub image: Option<ImageRef>,

    /// Rich-text biography
    #[serde(default, deserialize_with = "null_default")]
    pub bio: Vec<Block>,

    /// Posts written by this author
    #[serde(default, deserialize_with = "null_default")]
    pub posts: Vec<PostSummary>,
}

/// A reader comment on a post
#[derive(Debug, Clone, Deserialize)]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(rename = "_type", default)]
    pub kind: Option<String>,

    #[serde(rename = "_rev", default)]
    pub rev: Option<String>,

    #[serde(default)]
    pub post: Option<Reference>,

    #[serde(default, deserialize_with = "null_default")]
    pub name: String,

    #[serde(default, deserialize_with = "null_default")]
    pub email: String,

    #[serde(default, deserialize_with = "null_default")]
    pub comment: String,

    #[serde(default, deserialize_with = "null_default")]
    pub approved: bool,

    #[serde(rename = "_createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(rename = "_updatedAt", default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// `_id` + `slug` projection used for path enumeration
#[derive(Debug, Clone, Deserialize)]
pub struct PathEntry {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub slug: Option<Slug>,
}

impl PathEntry {
    /// Slug, if the document has a non-empty one
    pub fn slug(&self) -> Option<&str> {
        self.slug
            .as_ref()
            .map(|s| s.current.as_str())
            .filter(|s| !s.is_empty())
    }
}
