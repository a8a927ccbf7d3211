//! Hand-built `multipart/form-data` request bodies for router tests.

/// Boundary used by [`MultipartBody`].
pub const TEST_BOUNDARY: &str = "photorelay-test-boundary";

/// Incrementally assembled multipart body.
#[derive(Debug, Default, Clone)]
pub struct MultipartBody {
    bytes: Vec<u8>,
}

impl MultipartBody {
    /// Start an empty body.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a file part; `filename` is written verbatim, including an empty string.
    #[must_use]
    pub fn file(mut self, field: &str, filename: &str, contents: &[u8]) -> Self {
        self.open_part();
        self.bytes.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
                 Content-Type: image/jpeg\r\n\r\n"
            )
            .as_bytes(),
        );
        self.bytes.extend_from_slice(contents);
        self.bytes.extend_from_slice(b"\r\n");
        self
    }

    /// Append a plain text part.
    #[must_use]
    pub fn text(mut self, field: &str, value: &str) -> Self {
        self.open_part();
        self.bytes.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{field}\"\r\n\r\n{value}\r\n")
                .as_bytes(),
        );
        self
    }

    /// `Content-Type` header value matching the body.
    #[must_use]
    pub fn content_type() -> String {
        format!("multipart/form-data; boundary={TEST_BOUNDARY}")
    }

    /// Close the body and return its bytes.
    #[must_use]
    pub fn finish(mut self) -> Vec<u8> {
        self.bytes
            .extend_from_slice(format!("--{TEST_BOUNDARY}--\r\n").as_bytes());
        self.bytes
    }

    fn open_part(&mut self) {
        self.bytes
            .extend_from_slice(format!("--{TEST_BOUNDARY}\r\n").as_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_frames_parts_with_boundary() {
        let body = MultipartBody::new()
            .file("file", "a.jpg", b"xyz")
            .text("note", "hi")
            .finish();
        let text = String::from_utf8_lossy(&body);
        assert!(text.starts_with("--photorelay-test-boundary\r\n"));
        assert!(text.contains("filename=\"a.jpg\""));
        assert!(text.ends_with("--photorelay-test-boundary--\r\n"));
        assert!(MultipartBody::content_type().ends_with(TEST_BOUNDARY));
    }
}
