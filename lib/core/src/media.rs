//! Binary payload helpers.
//!
//! `ir.attachment.datas` and signature fields take raw base64; callers
//! often hold `data:` URIs, so the prefix has to come off before upload.

/// Strip a `data:<mime>;base64,` prefix, returning the raw base64 payload.
/// Plain base64 input passes through unchanged.
pub fn strip_data_uri(data: &str) -> &str {
    if !data.starts_with("data:") {
        return data;
    }
    match data.find(',') {
        Some(idx) => &data[idx + 1..],
        None => data,
    }
}

/// Extract the mime type from a data URI, if present.
pub fn data_uri_mime(data: &str) -> Option<&str> {
    let rest = data.strip_prefix("data:")?;
    let end = rest.find([';', ','])?;
    Some(&rest[..end])
}

/// Mime type guessed from a file extension.
pub fn mime_for_path(path: &str) -> &'static str {
    let lower = path.to_lowercase();
    if lower.ends_with(".png") {
        "image/png"
    } else if lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
        "image/jpeg"
    } else if lower.ends_with(".pdf") {
        "application/pdf"
    } else {
        "application/octet-stream"
    }
}

/// File extension for a mime type, for generated attachment names.
pub fn extension_for_mime(mime: &str) -> &'static str {
    if mime.contains("png") {
        "png"
    } else if mime.contains("jpeg") || mime.contains("jpg") {
        "jpg"
    } else if mime.contains("pdf") {
        "pdf"
    } else {
        "bin"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_data_uri_prefix() {
        assert_eq!(strip_data_uri("data:image/png;base64,iVBORw0K"), "iVBORw0K");
        assert_eq!(strip_data_uri("data:image/jpeg;base64,/9j/4AAQ"), "/9j/4AAQ");
    }

    #[test]
    fn plain_base64_passes_through() {
        assert_eq!(strip_data_uri("iVBORw0K"), "iVBORw0K");
    }

    #[test]
    fn mime_extraction() {
        assert_eq!(data_uri_mime("data:image/png;base64,AAAA"), Some("image/png"));
        assert_eq!(data_uri_mime("iVBORw0K"), None);
    }

    #[test]
    fn mime_and_extension_mapping() {
        assert_eq!(mime_for_path("photo.JPG"), "image/jpeg");
        assert_eq!(mime_for_path("scan.pdf"), "application/pdf");
        assert_eq!(mime_for_path("blob"), "application/octet-stream");
        assert_eq!(extension_for_mime("image/png"), "png");
        assert_eq!(extension_for_mime("application/pdf"), "pdf");
        assert_eq!(extension_for_mime("application/octet-stream"), "bin");
    }
}
