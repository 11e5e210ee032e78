//! List site content

use anyhow::Result;

use crate::helpers::{author_path, post_path};
use crate::Blog;

/// List site content by type
pub async fn run(blog: &Blog, content_type: &str) -> Result<()> {
    let pages = blog.pages()?;

    match content_type {
        "post" | "posts" => {
            let slugs = pages.post_paths().await?;
            println!("Posts ({}):", slugs.len());
            for slug in slugs {
                println!("  {}", slug);
            }
        }
        "author" | "authors" | "user" | "users" => {
            let slugs = pages.author_paths().await?;
            println!("Authors ({}):", slugs.len());
            for slug in slugs {
                println!("  {}", slug);
            }
        }
        "route" | "routes" => {
            let posts = pages.post_paths().await?;
            let authors = pages.author_paths().await?;
            println!("Routes ({}):", 1 + posts.len() + authors.len());
            println!("  /");
            for slug in posts {
                println!("  {}", post_path(&slug));
            }
            for slug in authors {
                println!("  {}", author_path(&slug));
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, author, route",
                content_type
            );
        }
    }

    Ok(())
}
