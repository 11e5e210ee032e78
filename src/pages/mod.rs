//! Page renderers - listing, article and author pages
//!
//! Each render is one fetch followed by mapping into template data. A
//! detail query that matches nothing is reported as
//! [`RenderError::NotFound`], never rendered half-empty.

use serde_json::json;
use tera::Context;

use crate::comments::FormView;
use crate::config::SiteConfig;
use crate::content::{queries, Author, PathEntry, Post, PostSummary, PortableTextRenderer};
use crate::helpers::{author_path, full_url_for, post_path, truncate};
use crate::sanity::{ClientError, ImageRef, ImageResolver, SanityClient};
use crate::templates::{
    article_context, ArticleData, AuthorData, CommentData, PostCard, SiteData, TemplateRenderer,
};

/// Listing cards cut descriptions to this many characters
const CARD_DESCRIPTION_CHARS: usize = 140;

/// Errors from rendering a page
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("{kind} not found: {slug}")]
    NotFound { kind: &'static str, slug: String },

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("template error: {0}")]
    Template(#[from] tera::Error),
}

impl RenderError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RenderError::NotFound { .. })
    }
}

/// Renders pages from live content
pub struct Pages {
    config: SiteConfig,
    client: SanityClient,
    images: ImageResolver,
    templates: TemplateRenderer,
}

impl Pages {
    /// Create renderers for a site
    pub fn new(config: &SiteConfig) -> anyhow::Result<Self> {
        Ok(Self {
            config: config.clone(),
            client: SanityClient::new(&config.sanity)?,
            images: ImageResolver::new(&config.sanity),
            templates: TemplateRenderer::new()?,
        })
    }

    /// The content client these pages read from
    pub fn client(&self) -> &SanityClient {
        &self.client
    }

    /// Seconds the comment acknowledgement stays up
    pub fn ack_seconds(&self) -> u64 {
        self.config.comments.ack_seconds
    }

    fn site_data(&self) -> SiteData {
        SiteData {
            title: self.config.title.clone(),
            description: self.config.description.clone(),
            language: self.config.language.clone(),
            date_format: self.config.date_format.clone(),
        }
    }

    fn image_url(&self, image: Option<&ImageRef>) -> String {
        image
            .and_then(|image| self.images.resolve(image))
            .unwrap_or_default()
    }

    fn post_card(&self, post: &PostSummary) -> PostCard {
        let author = post.author.as_ref();
        PostCard {
            title: post.title.clone(),
            description: truncate(&post.description, CARD_DESCRIPTION_CHARS, None),
            path: post_path(&post.slug.current),
            image: self.image_url(post.main_image.as_ref()),
            created_at: post.created_at.map(|d| d.to_rfc3339()),
            author_name: author.map(|a| a.name.clone()).filter(|n| !n.is_empty()),
            author_image: author
                .and_then(|a| a.image.as_ref())
                .and_then(|image| self.images.resolve(image)),
        }
    }

    /// Slugs for every `/post/{slug}` page
    pub async fn post_paths(&self) -> Result<Vec<String>, RenderError> {
        self.enumerate(queries::POST_PATHS).await
    }

    /// Slugs for every `/user/{slug}` page
    pub async fn author_paths(&self) -> Result<Vec<String>, RenderError> {
        self.enumerate(queries::AUTHOR_PATHS).await
    }

    async fn enumerate(&self, query: &str) -> Result<Vec<String>, RenderError> {
        let entries: Vec<PathEntry> = self.client.fetch(query, &[]).await?;
        Ok(entries
            .iter()
            .filter_map(PathEntry::slug)
            .map(str::to_string)
            .collect())
    }

    /// The front page
    pub async fn listing(&self) -> Result<String, RenderError> {
        let posts: Vec<PostSummary> = self.client.fetch(queries::LISTING, &[]).await?;
        tracing::debug!("Listing {} posts", posts.len());

        let cards: Vec<PostCard> = posts.iter().map(|p| self.post_card(p)).collect();

        let mut context = Context::new();
        context.insert("site", &self.site_data());
        context.insert("posts", &cards);
        Ok(self.templates.render("index.html", &context)?)
    }

    /// Fetch one post by slug
    pub async fn fetch_post(&self, slug: &str) -> Result<Post, RenderError> {
        let mut posts: Vec<Post> = self
            .client
            .fetch(queries::POST_BY_SLUG, &[("slug", json!(slug))])
            .await?;

        if posts.is_empty() {
            return Err(RenderError::NotFound {
                kind: "post",
                slug: slug.to_string(),
            });
        }
        Ok(posts.swap_remove(0))
    }

    /// An article page with the comment form in the given state
    pub async fn post(&self, slug: &str, form: &FormView) -> Result<String, RenderError> {
        let post = self.fetch_post(slug).await?;
        self.render_post(&post, form)
    }

    /// Render an already fetched post
    pub fn render_post(&self, post: &Post, form: &FormView) -> Result<String, RenderError> {
        let author = post.author.clone().unwrap_or_default();
        let path = post_path(&post.slug.current);
        let body = PortableTextRenderer::new(&self.images).render(&post.body);

        let article = ArticleData {
            id: post.id.clone(),
            title: post.title.clone(),
            description: post.description.clone(),
            canonical: full_url_for(&self.config, &path),
            path,
            image: self.image_url(post.main_image.as_ref()),
            created_at: post.created_at.map(|d| d.to_rfc3339()),
            author_name: author.name.clone(),
            author_image: self.image_url(author.image.as_ref()),
            author_path: author
                .slug
                .as_ref()
                .filter(|s| !s.current.is_empty())
                .map(|s| author_path(&s.current)),
            body,
        };

        let comments: Vec<CommentData> = post
            .approved_comments()
            .map(|c| CommentData {
                id: c.id.clone(),
                name: c.name.clone(),
                comment: c.comment.clone(),
            })
            .collect();

        let context = article_context(&self.site_data(), &article, &comments, form);
        Ok(self.templates.render("post.html", &context)?)
    }

    /// An author page
    pub async fn author(&self, slug: &str) -> Result<String, RenderError> {
        let mut authors: Vec<Author> = self
            .client
            .fetch(queries::AUTHOR_BY_SLUG, &[("slug", json!(slug))])
            .await?;

        if authors.is_empty() {
            return Err(RenderError::NotFound {
                kind: "author",
                slug: slug.to_string(),
            });
        }
        let author = authors.swap_remove(0);

        let path = author_path(&author.slug.current);
        let data = AuthorData {
            name: author.name.clone(),
            canonical: full_url_for(&self.config, &path),
            path,
            image: self.image_url(author.image.as_ref()),
            bio: PortableTextRenderer::new(&self.images).render(&author.bio),
            posts: author.posts.iter().map(|p| self.post_card(p)).collect(),
        };

        let mut context = Context::new();
        context.insert("site", &self.site_data());
        context.insert("page_title", &data.name);
        context.insert("author", &data);
        Ok(self.templates.render("user.html", &context)?)
    }

    /// The 404 page
    pub fn not_found(&self) -> Result<String, RenderError> {
        let mut context = Context::new();
        context.insert("site", &self.site_data());
        context.insert("page_title", "Not found");
        Ok(self.templates.render("404.html", &context)?)
    }

    /// The generic failure page
    pub fn failure(&self) -> Result<String, RenderError> {
        let mut context = Context::new();
        context.insert("site", &self.site_data());
        Ok(self.templates.render("error.html", &context)?)
    }
}
