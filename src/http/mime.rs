/// Guesses a Content-Type from a file extension.
pub fn mime_type(path: &str) -> &'static str {
    let ext = path.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("");

    match ext.to_ascii_lowercase().as_str() {
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "txt" => "text/plain",
        "js" => "application/javascript",
        "json" => "application/json",
        "xml" => "application/xml",
        "png" => "image/png",
        "jpg" | "jpeg" | "jpe" => "image/jpeg",
        "gif" => "image/gif",
        "svg" | "svgz" => "image/svg+xml",
        "ico" => "image/vnd.microsoft.icon",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        "pdf" => "application/pdf",
        "wasm" => "application/wasm",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_extensions() {
        assert_eq!(mime_type("index.html"), "text/html");
        assert_eq!(mime_type("style.CSS"), "text/css");
        assert_eq!(mime_type("logo.svg"), "image/svg+xml");
    }

    #[test]
    fn unknown_extension_falls_back() {
        assert_eq!(mime_type("archive.tar.zst"), "application/octet-stream");
        assert_eq!(mime_type("no_extension"), "application/octet-stream");
    }
}
