//! URL helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// Characters escaped inside a single path segment
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Generate a URL with the root path
///
/// # Examples
/// ```ignore
/// url_for("/blog/", "/css/style.css") // -> "/blog/css/style.css"
/// ```
pub fn url_for(root: &str, path: &str) -> String {
    let root = root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Generate a full URL including the domain
pub fn full_url_for(base_url: &str, root: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), url_for(root, path))
}

/// Percent-encode one path segment
pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

/// Route of a post detail page
pub fn post_url(root: &str, slug: &str) -> String {
    url_for(root, &format!("posts/{}/", encode_segment(slug)))
}

/// Public path of an image belonging to a post
///
/// Post images live under `images/posts/<slug>/`.
pub fn post_image_path(root: &str, slug: &str, image: &str) -> String {
    url_for(
        root,
        &format!(
            "images/posts/{}/{}",
            encode_segment(slug),
            image.trim_start_matches("./")
        ),
    )
}
