use axum::{
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use bytes::Bytes;

/// How the client should present the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Inline,
    Attachment,
}

/// `Content-Disposition` with an ASCII fallback name and the UTF-8 name
/// percent-encoded in `filename*`.
pub fn content_disposition(disposition: Disposition, file_name: &str) -> HeaderValue {
    let kind = match disposition {
        Disposition::Inline => "inline",
        Disposition::Attachment => "attachment",
    };
    let fallback: String = file_name
        .chars()
        .map(|c| match c {
            ' '..='~' if c != '"' && c != '\\' => c,
            _ => '_',
        })
        .collect();
    let mut encoded = String::with_capacity(file_name.len());
    for b in file_name.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'.' | b'_' | b'-' => {
                encoded.push(char::from(b))
            }
            _ => encoded.push_str(&format!("%{b:02X}")),
        }
    }
    HeaderValue::from_str(&format!(
        "{kind}; filename=\"{fallback}\"; filename*=UTF-8''{encoded}"
    ))
    .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

pub fn file_response(
    bytes: Bytes,
    file_name: &str,
    mime_type: &'static str,
    disposition: Disposition,
) -> Response {
    (
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(mime_type)),
            (
                header::CONTENT_DISPOSITION,
                content_disposition(disposition, file_name),
            ),
        ],
        bytes,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition_encodes_utf8_names() {
        let value = content_disposition(Disposition::Attachment, "José_Pérez_CV_Modern.pdf");
        assert_eq!(
            value.to_str().unwrap(),
            "attachment; filename=\"Jos__P_rez_CV_Modern.pdf\"; filename*=UTF-8''Jos%C3%A9_P%C3%A9rez_CV_Modern.pdf"
        );
    }

    #[test]
    fn test_inline_disposition() {
        let value = content_disposition(Disposition::Inline, "Ana_Ruiz_CV_Classic.pdf");
        assert!(value.to_str().unwrap().starts_with("inline; filename=\"Ana_Ruiz_CV_Classic.pdf\""));
    }
}
