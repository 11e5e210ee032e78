//! GROQ queries issued by the page renderers

/// Every post, projected for the listing page
pub const LISTING: &str = r#"*[_type == "post"]{
  _id,
  _createdAt,
  title,
  author->{
    name,
    image
  },
  description,
  mainImage,
  slug
}"#;

/// Path enumeration for `/post/{slug}`
pub const POST_PATHS: &str = r#"*[_type == "post"]{
  _id,
  slug
}"#;

/// One post by slug, with its author and approved comments
pub const POST_BY_SLUG: &str = r#"*[_type == "post" && slug.current == $slug]{
  _id,
  _createdAt,
  slug,
  description,
  title,
  body,
  mainImage,
  author->{
    name,
    image,
    slug
  },
  'comments': *[
    _type == "comment" &&
    post._ref == ^._id &&
    approved == true
  ]
}"#;

/// Path enumeration for `/user/{slug}`
pub const AUTHOR_PATHS: &str = r#"*[_type == "author"]{
  _id,
  slug
}"#;

/// One author by slug, with the posts that reference them
pub const AUTHOR_BY_SLUG: &str = r#"*[_type == "author" && slug.current == $slug]{
  _id,
  slug,
  name,
  image,
  bio,
  'posts': *[_type == "post" && author._ref == ^._id]{
    _id,
    _createdAt,
    title,
    description,
    mainImage,
    slug
  }
}"#;
