//! Built-in templates using the Tera template engine
//!
//! All templates are embedded directly in the binary. Autoescaping is
//! off so URLs stay readable; text coming from the content store or a
//! reader goes through the `escape` filter, and attribute values
//! (links, image sources, ids) through `attr`.

use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::comments::FormView;
use crate::helpers::{format_timestamp, html_escape};

/// Template renderer with the embedded blog theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> tera::Result<Self> {
        let mut tera = Tera::default();

        // Paths and image URLs must not be escaped
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("theme/layout.html")),
            ("index.html", include_str!("theme/index.html")),
            ("post.html", include_str!("theme/post.html")),
            ("user.html", include_str!("theme/user.html")),
            ("404.html", include_str!("theme/404.html")),
            ("error.html", include_str!("theme/error.html")),
            // Partials
            (
                "partials/header.html",
                include_str!("theme/partials/header.html"),
            ),
            (
                "partials/post_card.html",
                include_str!("theme/partials/post_card.html"),
            ),
            (
                "partials/comment_form.html",
                include_str!("theme/partials/comment_form.html"),
            ),
        ])?;

        tera.register_filter("date_format", date_format_filter);
        tera.register_filter("attr", attr_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> tera::Result<String> {
        self.tera.render(template_name, context)
    }
}

/// Tera filter: format an RFC 3339 timestamp
fn date_format_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("date_format", "value", String, value);
    let format = match args.get("format") {
        Some(val) => tera::try_get_value!("date_format", "format", String, val),
        None => "YYYY-MM-DD".to_string(),
    };

    Ok(tera::Value::String(format_timestamp(&s, &format)))
}

/// Tera filter: escape a value for a quoted attribute, leaving `/` alone
fn attr_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("attr", "value", String, value);
    Ok(tera::Value::String(html_escape(&s)))
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub description: String,
    pub language: String,
    pub date_format: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostCard {
    pub title: String,
    pub description: String,
    pub path: String,
    pub image: String,
    pub created_at: Option<String>,
    pub author_name: Option<String>,
    pub author_image: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArticleData {
    pub id: String,
    pub title: String,
    pub description: String,
    pub path: String,
    pub canonical: String,
    pub image: String,
    pub created_at: Option<String>,
    pub author_name: String,
    pub author_image: String,
    pub author_path: Option<String>,
    pub body: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentData {
    pub id: String,
    pub name: String,
    pub comment: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthorData {
    pub name: String,
    pub path: String,
    pub canonical: String,
    pub image: String,
    pub bio: String,
    pub posts: Vec<PostCard>,
}

/// Context for an article page
pub fn article_context(
    site: &SiteData,
    article: &ArticleData,
    comments: &[CommentData],
    form: &FormView,
) -> Context {
    let mut context = Context::new();
    context.insert("site", site);
    context.insert("page_title", &article.title);
    context.insert("article", article);
    context.insert("comments", comments);
    context.insert("form", form);
    context
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> SiteData {
        SiteData {
            title: "medium blog".to_string(),
            description: String::new(),
            language: "en".to_string(),
            date_format: "YYYY-MM-DD".to_string(),
        }
    }

    #[test]
    fn test_templates_load() {
        assert!(TemplateRenderer::new().is_ok());
    }

    #[test]
    fn test_date_format_filter() {
        let mut args = HashMap::new();
        args.insert("format".to_string(), tera::Value::from("DD/MM/YYYY"));
        let value = date_format_filter(&tera::Value::from("2022-03-01T10:11:12Z"), &args).unwrap();
        assert_eq!(value, tera::Value::from("01/03/2022"));
    }

    #[test]
    fn test_attr_filter() {
        let value = attr_filter(
            &tera::Value::from(r#"/post/a" onclick="x"#),
            &HashMap::new(),
        )
        .unwrap();
        assert_eq!(value, tera::Value::from("/post/a&quot; onclick=&quot;x"));
    }

    #[test]
    fn test_render_not_found_page() {
        let renderer = TemplateRenderer::new().unwrap();
        let mut context = Context::new();
        context.insert("site", &site());
        let html = renderer.render("404.html", &context).unwrap();
        assert!(html.contains("404"));
        assert!(html.contains("medium blog"));
    }

    #[test]
    fn test_comment_text_is_escaped() {
        let renderer = TemplateRenderer::new().unwrap();
        let article = ArticleData {
            id: "p1".to_string(),
            title: "Hello".to_string(),
            description: String::new(),
            path: "/post/hello".to_string(),
            canonical: "http://localhost:3000/post/hello".to_string(),
            image: String::new(),
            created_at: None,
            author_name: "Ada".to_string(),
            author_image: String::new(),
            author_path: None,
            body: "<p>body</p>".to_string(),
        };
        let comments = vec![CommentData {
            id: "c1".to_string(),
            name: "Mallory".to_string(),
            comment: "<script>x</script>".to_string(),
        }];
        let context = article_context(&site(), &article, &comments, &FormView::idle(5));
        let html = renderer.render("post.html", &context).unwrap();

        assert!(html.contains("<p>body</p>"));
        assert!(html.contains("&lt;script&gt;x&lt;"));
        assert!(!html.contains("<script>x</script>"));
    }
}
