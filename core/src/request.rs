use std::mem;
use std::str::FromStr;

use http::uri::Authority;
use http::uri::PathAndQuery;
use http::uri::Scheme;
use http::HeaderMap;
use http::HeaderValue;
use http::Method;
use http::Uri;

use crate::Error;
use crate::Result;

/// Signing context for request.
///
/// Built from `http::request::Parts` by taking the headers and uri out of
/// them, and applied back once the signature has been computed.
#[derive(Debug)]
pub struct SigningRequest {
    /// HTTP method.
    pub method: Method,
    /// HTTP scheme.
    pub scheme: Scheme,
    /// HTTP authority.
    pub authority: Authority,
    /// HTTP path, exactly as it will be sent.
    pub path: String,
    /// HTTP query parameters.
    pub query: Vec<(String, String)>,
    /// HTTP headers.
    pub headers: HeaderMap,
}

impl SigningRequest {
    /// Build a signing context from http::request::Parts.
    pub fn build(parts: &mut http::request::Parts) -> Result<Self> {
        let uri = mem::take(&mut parts.uri).into_parts();
        let paq = uri
            .path_and_query
            .unwrap_or_else(|| PathAndQuery::from_static("/"));

        Ok(SigningRequest {
            method: parts.method.clone(),
            scheme: uri.scheme.unwrap_or(Scheme::HTTPS),
            authority: uri.authority.ok_or_else(|| {
                Error::request_invalid("request without authority is invalid for signing")
            })?,
            path: paq.path().to_string(),
            query: paq
                .query()
                .map(|v| {
                    form_urlencoded::parse(v.as_bytes())
                        .map(|(k, v)| (k.into_owned(), v.into_owned()))
                        .collect()
                })
                .unwrap_or_default(),

            // Take the headers out of the request to avoid copy.
            // We will return it back when apply the context.
            headers: mem::take(&mut parts.headers),
        })
    }

    /// Apply the signing context back to http::request::Parts.
    ///
    /// Query pairs are written as they are, callers that changed them must
    /// have percent-encoded them already.
    pub fn apply(mut self, parts: &mut http::request::Parts) -> Result<()> {
        // Return headers back.
        mem::swap(&mut parts.headers, &mut self.headers);
        parts.method = self.method;
        parts.uri = {
            let mut uri_parts = mem::take(&mut parts.uri).into_parts();
            uri_parts.scheme = Some(self.scheme);
            uri_parts.authority = Some(self.authority);
            uri_parts.path_and_query = {
                let mut paq = self.path;
                if !self.query.is_empty() {
                    paq.push('?');
                    for (i, (k, v)) in self.query.iter().enumerate() {
                        if i > 0 {
                            paq.push('&');
                        }

                        paq.push_str(k);
                        if !v.is_empty() {
                            paq.push('=');
                            paq.push_str(v);
                        }
                    }
                }

                Some(PathAndQuery::from_str(&paq)?)
            };
            Uri::from_parts(uri_parts)?
        };

        Ok(())
    }

    /// Normalize header value.
    ///
    /// Leading and trailing whitespace (tabs included) is removed and inner
    /// runs of spaces are collapsed into one.
    pub fn header_value_normalize(v: &mut HeaderValue) -> Result<()> {
        let bs = v.as_bytes();
        let start = bs
            .iter()
            .position(|b| !b.is_ascii_whitespace())
            .unwrap_or(bs.len());
        let end = bs
            .iter()
            .rposition(|b| !b.is_ascii_whitespace())
            .map_or(start, |i| i + 1);
        let trimmed = &bs[start..end];
        if trimmed.len() == bs.len() && !trimmed.windows(2).any(|w| w == b"  ") {
            return Ok(());
        }

        let mut normalized = Vec::with_capacity(trimmed.len());
        for (i, b) in trimmed.iter().enumerate() {
            if *b == b' ' && i > 0 && trimmed[i - 1] == b' ' {
                continue;
            }
            normalized.push(*b);
        }

        let sensitive = v.is_sensitive();
        *v = HeaderValue::from_bytes(&normalized)?;
        v.set_sensitive(sensitive);
        Ok(())
    }

    /// Get header names as sorted vector.
    ///
    /// `HeaderName` is always lowercase, so the result is sorted by the
    /// lowercase name.
    pub fn header_name_to_vec_sorted(&self) -> Vec<&str> {
        let mut h = self
            .headers
            .keys()
            .map(|k| k.as_str())
            .collect::<Vec<&str>>();
        h.sort_unstable();

        h
    }

    /// Get all values of a header joined by `,`.
    pub fn header_value_joined(&self, name: &str) -> Result<String> {
        let mut values = Vec::new();
        for v in self.headers.get_all(name) {
            values.push(v.to_str()?);
        }

        Ok(values.join(","))
    }

    /// Convert sorted pairs to string.
    ///
    /// ```shell
    /// [(a, b), (c, d)] => "a=b&c=d"
    /// ```
    pub fn query_to_string(mut query: Vec<(String, String)>, sep: &str, join: &str) -> String {
        let mut s = String::with_capacity(16);

        query.sort();

        for (idx, (k, v)) in query.into_iter().enumerate() {
            if idx != 0 {
                s.push_str(join);
            }

            s.push_str(&k);
            s.push_str(sep);
            s.push_str(&v);
        }

        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::{CONTENT_TYPE, HOST};

    fn parts(uri: &str) -> http::request::Parts {
        http::Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(())
            .expect("request must be valid")
            .into_parts()
            .0
    }

    #[test]
    fn test_build_and_apply() -> Result<()> {
        let mut parts = parts("https://example.com/model/test-model/invoke?b=2&a=1");
        let mut req = SigningRequest::build(&mut parts)?;

        assert_eq!(req.method, Method::POST);
        assert_eq!(req.authority.as_str(), "example.com");
        assert_eq!(req.path, "/model/test-model/invoke");
        assert_eq!(
            req.query,
            vec![
                ("b".to_string(), "2".to_string()),
                ("a".to_string(), "1".to_string())
            ]
        );
        assert!(parts.headers.is_empty());

        req.headers
            .insert(HOST, HeaderValue::from_static("example.com"));
        req.apply(&mut parts)?;

        assert_eq!(
            parts.uri.to_string(),
            "https://example.com/model/test-model/invoke?b=2&a=1"
        );
        assert_eq!(parts.headers.len(), 2);
        Ok(())
    }

    #[test]
    fn test_build_without_authority() {
        let mut parts = parts("/model/test-model/invoke");
        let err = SigningRequest::build(&mut parts).expect_err("must fail");
        assert_eq!(err.kind(), crate::ErrorKind::RequestInvalid);
    }

    #[test]
    fn test_header_value_normalize() -> Result<()> {
        let cases = [
            ("application/json", "application/json"),
            ("  padded  ", "padded"),
            ("a   b    c", "a b c"),
            ("\tpadded\t", "padded"),
            (" \t mixed \t ", "mixed"),
            ("inner\ttab", "inner\ttab"),
            ("", ""),
        ];

        for (input, expected) in cases {
            let mut v = HeaderValue::from_static(input);
            SigningRequest::header_value_normalize(&mut v)?;
            assert_eq!(v.to_str()?, expected, "Failed on input: {input:?}");
        }

        let mut v = HeaderValue::from_static("\t token \t");
        v.set_sensitive(true);
        SigningRequest::header_value_normalize(&mut v)?;
        assert_eq!(v.to_str()?, "token");
        assert!(v.is_sensitive());
        Ok(())
    }

    #[test]
    fn test_header_name_sorted() -> Result<()> {
        let mut parts = parts("https://example.com/");
        parts
            .headers
            .insert("X-Amz-Date", HeaderValue::from_static("20240101T000000Z"));
        parts
            .headers
            .insert(HOST, HeaderValue::from_static("example.com"));
        let req = SigningRequest::build(&mut parts)?;

        assert_eq!(
            req.header_name_to_vec_sorted(),
            vec!["content-type", "host", "x-amz-date"]
        );
        Ok(())
    }

    #[test]
    fn test_header_value_joined() -> Result<()> {
        let mut parts = parts("https://example.com/");
        parts
            .headers
            .append("x-amz-meta-tag", HeaderValue::from_static("a"));
        parts
            .headers
            .append("x-amz-meta-tag", HeaderValue::from_static("b"));
        let req = SigningRequest::build(&mut parts)?;

        assert_eq!(req.header_value_joined("x-amz-meta-tag")?, "a,b");
        assert_eq!(req.header_value_joined("x-amz-missing")?, "");
        Ok(())
    }

    #[test]
    fn test_query_to_string() {
        let query = vec![
            ("max-keys".to_string(), "3".to_string()),
            ("list-type".to_string(), "2".to_string()),
        ];
        assert_eq!(
            SigningRequest::query_to_string(query, "=", "&"),
            "list-type=2&max-keys=3"
        );
        assert_eq!(SigningRequest::query_to_string(vec![], "=", "&"), "");
    }
}
