// src/resolver/mime.rs

/// MIME type for a file extension (without the dot), case-insensitive.
pub fn mime_for_extension(extension: &str) -> Option<&'static str> {
    let mime = match extension.to_ascii_lowercase().as_str() {
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" | "mjs" => "text/javascript",
        "json" => "application/json",
        "txt" => "text/plain",
        "md" => "text/markdown",
        "xml" => "application/xml",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        "wasm" => "application/wasm",
        "pdf" => "application/pdf",
        "mp3" => "audio/mpeg",
        "mp4" => "video/mp4",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        _ => return None,
    };
    Some(mime)
}

/// MIME type implied by the last segment of a URL path; the query is ignored.
pub fn mime_for_path(path: &str) -> Option<String> {
    let pathname = path.split('?').next().unwrap_or(path);
    let last_segment = pathname.rsplit('/').next().unwrap_or(pathname);
    let (_, extension) = last_segment.rsplit_once('.')?;
    mime_for_extension(extension).map(str::to_string)
}
