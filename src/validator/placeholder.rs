use url::Url;

const PLACEHOLDER_WIDTH: u32 = 1200;
const PLACEHOLDER_HEIGHT: u32 = 630;

/// Stable stand-in image for `url`: the same URL always maps to the same image.
pub fn placeholder_image(url: &Url) -> String {
    placeholder_for_seed(url.as_str())
}

/// Same as [`placeholder_image`] for input that never became a URL.
pub fn placeholder_for_seed(seed: &str) -> String {
    let digest = md5::compute(seed.as_bytes());
    format!("https://picsum.photos/seed/{digest:x}/{PLACEHOLDER_WIDTH}/{PLACEHOLDER_HEIGHT}")
}
