//! Content type lookup by file-name extension.

/// Content type used when the extension is missing or unknown.
pub const MIME_OCTET_STREAM: &str = "application/octet-stream";

/// Resolve a content type from a lowercase extension.
pub fn mime_type_from_extension(extension: &str) -> Option<&'static str> {
    let mime = match extension {
        "txt" | "text" | "log" => "text/plain",
        "htm" | "html" => "text/html",
        "css" => "text/css",
        "csv" => "text/csv",
        "ics" => "text/calendar",
        "vcf" => "text/vcard",
        "xml" => "application/xml",
        "json" => "application/json",
        "rtf" => "application/rtf",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" => "application/gzip",
        "7z" => "application/x-7z-compressed",
        "rar" => "application/vnd.rar",
        "tar" => "application/x-tar",
        "doc" => "application/msword",
        "dot" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "odt" => "application/vnd.oasis.opendocument.text",
        "ods" => "application/vnd.oasis.opendocument.spreadsheet",
        "odp" => "application/vnd.oasis.opendocument.presentation",
        "msg" => "application/vnd.ms-outlook",
        "eml" => "message/rfc822",
        "png" => "image/png",
        "jpg" | "jpeg" | "jpe" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        _ => return None,
    };
    Some(mime)
}

/// Resolve a content type from a file name, falling back to
/// [`MIME_OCTET_STREAM`].
pub fn mime_type_from_filename(filename: &str) -> &'static str {
    std::path::Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| mime_type_from_extension(&ext.to_ascii_lowercase()))
        .unwrap_or(MIME_OCTET_STREAM)
}
