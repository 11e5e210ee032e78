//! Configuration module

mod site;

pub use site::CommentsConfig;
pub use site::SanityConfig;
pub use site::SiteConfig;
