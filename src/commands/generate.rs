//! Pre-render the site into the public directory

use anyhow::Result;
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use crate::comments::FormView;
use crate::pages::RenderError;
use crate::Blog;

/// Render the listing, every post and every author page
///
/// Paths come from the same enumeration queries the server would answer;
/// a slug whose detail query comes back empty is skipped, any other
/// failure aborts the run.
pub async fn run(blog: &Blog) -> Result<()> {
    let start = std::time::Instant::now();
    let pages = blog.pages()?;

    fs::create_dir_all(&blog.public_dir)?;
    copy_static_assets(&blog.static_dir, &blog.public_dir)?;

    write_page(&blog.public_dir.join("index.html"), &pages.listing().await?)?;
    write_page(&blog.public_dir.join("404.html"), &pages.not_found()?)?;

    let form = FormView::idle(pages.ack_seconds());
    let post_slugs = pages.post_paths().await?;
    let mut posts = 0;
    for slug in &post_slugs {
        if !is_path_segment(slug) {
            tracing::warn!("Skipping post/{:?}: slug is not a single path segment", slug);
            continue;
        }
        let html = pages.post(slug, &form).await;
        if write_entry(blog, "post", slug, html)? {
            posts += 1;
        }
    }

    let author_slugs = pages.author_paths().await?;
    let mut authors = 0;
    for slug in &author_slugs {
        if !is_path_segment(slug) {
            tracing::warn!("Skipping user/{:?}: slug is not a single path segment", slug);
            continue;
        }
        let html = pages.author(slug).await;
        if write_entry(blog, "user", slug, html)? {
            authors += 1;
        }
    }

    let duration = start.elapsed();
    tracing::info!(
        "Generated {} posts and {} authors in {:.2}s",
        posts,
        authors,
        duration.as_secs_f64()
    );

    Ok(())
}

fn write_entry(
    blog: &Blog,
    prefix: &str,
    slug: &str,
    html: Result<String, RenderError>,
) -> Result<bool> {
    match html {
        Ok(html) => {
            write_page(&entry_path(&blog.public_dir, prefix, slug), &html)?;
            Ok(true)
        }
        Err(err) if err.is_not_found() => {
            tracing::warn!("Skipping {}/{}: {}", prefix, slug, err);
            Ok(false)
        }
        Err(err) => Err(anyhow::Error::new(err).context(format!(
            "Failed to render /{}/{}",
            prefix, slug
        ))),
    }
}

/// Slugs become directory names; anything but one plain component
/// (`..`, separators, absolute paths) could land outside the output dir
fn is_path_segment(slug: &str) -> bool {
    let mut components = Path::new(slug).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !slug.contains(['/', '\\'])
}

fn entry_path(public_dir: &Path, prefix: &str, slug: &str) -> PathBuf {
    public_dir.join(prefix).join(slug).join("index.html")
}

fn write_page(output_path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| anyhow::anyhow!("Failed to create dir {:?}: {}", parent, e))?;
    }
    fs::write(output_path, html)
        .map_err(|e| anyhow::anyhow!("Failed to write {:?}: {}", output_path, e))?;
    tracing::debug!("Generated: {:?}", output_path);
    Ok(())
}

/// Copy the static directory (favicon and friends) as-is
fn copy_static_assets(static_dir: &Path, public_dir: &Path) -> Result<()> {
    if !static_dir.exists() {
        return Ok(());
    }

    for entry in WalkDir::new(static_dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let relative = path.strip_prefix(static_dir)?;
        let dest = public_dir.join(relative);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(path, &dest)?;
    }

    Ok(())
}
