use base64::{engine::general_purpose, Engine as _};

/// Fallback MIME type when an upload declares none
pub const DEFAULT_IMAGE_MIME: &str = "image/png";

/// Whether a declared content type names an image (case-insensitive)
pub fn is_image_content_type(content_type: &str) -> bool {
    content_type.trim().to_lowercase().starts_with("image/")
}

/// Embed raw image bytes as a base64 data URL ("data:image/jpeg;base64,<data>")
pub fn bytes_to_data_url(bytes: &[u8], mime_type: &str) -> String {
    let mime = if mime_type.trim().is_empty() {
        DEFAULT_IMAGE_MIME
    } else {
        mime_type.trim()
    };

    format!("data:{};base64,{}", mime, general_purpose::STANDARD.encode(bytes))
}
