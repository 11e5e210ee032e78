//! Rich-text (Portable Text) rendering
//!
//! Bodies and biographies arrive as a flat list of typed blocks. Text
//! blocks carry a style, spans with marks, and optional list metadata;
//! consecutive list items are grouped into `<ul>`/`<ol>` here.

use serde::Deserialize;

use crate::helpers::html_escape;
use crate::sanity::{ImageRef, ImageResolver};

/// One rich-text block
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "_type")]
pub enum Block {
    #[serde(rename = "block")]
    Text(TextBlock),
    #[serde(rename = "image")]
    Image(ImageRef),
    /// Block types without a serializer are skipped
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextBlock {
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub children: Vec<Span>,
    #[serde(rename = "markDefs", default)]
    pub mark_defs: Vec<MarkDef>,
    #[serde(rename = "listItem", default)]
    pub list_item: Option<String>,
    #[serde(default)]
    pub level: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Span {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub marks: Vec<String>,
}

/// Annotation referenced from a span's marks by key
#[derive(Debug, Clone, Deserialize)]
pub struct MarkDef {
    #[serde(rename = "_key")]
    pub key: String,
    #[serde(rename = "_type")]
    pub kind: String,
    #[serde(default)]
    pub href: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Bullet,
    Number,
}

impl ListKind {
    fn from_item(item: &str) -> Self {
        match item {
            "number" => ListKind::Number,
            _ => ListKind::Bullet,
        }
    }

    fn tag(self) -> &'static str {
        match self {
            ListKind::Bullet => "ul",
            ListKind::Number => "ol",
        }
    }
}

struct OpenList {
    kind: ListKind,
    level: u32,
    item_open: bool,
}

/// Renders blocks to HTML, resolving image blocks to CDN URLs
pub struct PortableTextRenderer<'a> {
    images: &'a ImageResolver,
}

impl<'a> PortableTextRenderer<'a> {
    pub fn new(images: &'a ImageResolver) -> Self {
        Self { images }
    }

    /// Render a block list to HTML
    pub fn render(&self, blocks: &[Block]) -> String {
        let mut out = String::new();
        let mut lists: Vec<OpenList> = Vec::new();

        for block in blocks {
            match block {
                Block::Text(text) if text.list_item.is_some() => {
                    let kind = ListKind::from_item(text.list_item.as_deref().unwrap_or_default());
                    let level = text.level.unwrap_or(1).max(1);
                    open_list_item(&mut out, &mut lists, kind, level);
                    out.push_str(&self.render_spans(text));
                }
                Block::Text(text) => {
                    close_lists(&mut out, &mut lists, 0);
                    out.push_str(&self.render_text_block(text));
                }
                Block::Image(image) => {
                    close_lists(&mut out, &mut lists, 0);
                    if let Some(src) = self.images.image(image).auto_format().url() {
                        out.push_str(&format!(
                            r#"<img class="my-5" src="{}" alt="{}"/>"#,
                            html_escape(&src),
                            html_escape(image.alt.as_deref().unwrap_or(""))
                        ));
                    }
                }
                Block::Unknown => {}
            }
        }

        close_lists(&mut out, &mut lists, 0);
        out
    }

    fn render_text_block(&self, block: &TextBlock) -> String {
        let inner = self.render_spans(block);
        match block.style.as_deref().unwrap_or("normal") {
            "h1" => format!(r#"<h1 class="my-5 text-2xl font-bold">{}</h1>"#, inner),
            "h2" => format!(r#"<h2 class="my-5 text-xl font-bold">{}</h2>"#, inner),
            style @ ("h3" | "h4" | "h5" | "h6") => format!("<{0}>{1}</{0}>", style, inner),
            "blockquote" => format!("<blockquote>{}</blockquote>", inner),
            _ => format!("<p>{}</p>", inner),
        }
    }

    fn render_spans(&self, block: &TextBlock) -> String {
        let mut out = String::new();
        for span in &block.children {
            let mut closing = Vec::new();
            for mark in &span.marks {
                let (open, close) = mark_tags(mark, &block.mark_defs);
                out.push_str(&open);
                closing.push(close);
            }
            out.push_str(&html_escape(&span.text).replace('\n', "<br/>"));
            for close in closing.iter().rev() {
                out.push_str(close);
            }
        }
        out
    }
}

fn mark_tags(mark: &str, defs: &[MarkDef]) -> (String, String) {
    let simple = |tag: &str| (format!("<{}>", tag), format!("</{}>", tag));
    match mark {
        "strong" => simple("strong"),
        "em" => simple("em"),
        "code" => simple("code"),
        "underline" => (
            r#"<span style="text-decoration: underline">"#.to_string(),
            "</span>".to_string(),
        ),
        "strike-through" => simple("del"),
        key => match defs.iter().find(|d| d.key == key) {
            Some(def) if def.kind == "link" => (
                format!(
                    r#"<a href="{}">"#,
                    html_escape(def.href.as_deref().unwrap_or("#"))
                ),
                "</a>".to_string(),
            ),
            _ => (String::new(), String::new()),
        },
    }
}

fn open_list_item(out: &mut String, lists: &mut Vec<OpenList>, kind: ListKind, level: u32) {
    close_lists(out, lists, level);

    let same_level = lists
        .last()
        .filter(|top| top.level == level)
        .map(|top| (top.kind, top.item_open));

    match same_level {
        Some((open_kind, _)) if open_kind != kind => {
            close_lists(out, lists, level - 1);
            push_list(out, lists, kind, level);
        }
        Some((_, item_open)) => {
            if item_open {
                out.push_str("</li>");
            }
        }
        None => push_list(out, lists, kind, level),
    }

    out.push_str("<li>");
    if let Some(top) = lists.last_mut() {
        top.item_open = true;
    }
}

fn push_list(out: &mut String, lists: &mut Vec<OpenList>, kind: ListKind, level: u32) {
    out.push_str(&format!("<{}>", kind.tag()));
    lists.push(OpenList {
        kind,
        level,
        item_open: false,
    });
}

/// Close every open list deeper than `level`
fn close_lists(out: &mut String, lists: &mut Vec<OpenList>, level: u32) {
    while lists.last().is_some_and(|top| top.level > level) {
        if let Some(top) = lists.pop() {
            if top.item_open {
                out.push_str("</li>");
            }
            out.push_str(&format!("</{}>", top.kind.tag()));
        }
    }
}
