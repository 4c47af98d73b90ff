//! Per-post content cleaning.
//!
//! [`transform`] turns one exported post into its publishable form:
//!
//! ```text
//! raw text ──▶ entity decode ──▶ split `---` blocks ─┬─▶ metadata ─▶ filtered header
//!                                                    └─▶ body ─────▶ markup cleanup
//! ```
//!
//! The result carries the date prefix used to name the output file.

pub mod frontmatter;
pub mod markup;
pub mod metadata;

use crate::utils::date::{self, DateParseError};
use crate::utils::html;
use metadata::{DateField, Metadata, MetadataError};
use thiserror::Error;

/// Prefix used for posts without a usable date.
pub const UNDATED: &str = "undated";

/// Errors that stop a single post from being cleaned.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("malformed metadata in `{file}`")]
    MalformedMetadata {
        file: String,
        #[source]
        source: MetadataError,
    },

    #[error("failed to write metadata header for `{file}`")]
    Serialize {
        file: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// A cleaned post, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedDocument {
    /// Rebuilt header, blank line, cleaned body
    pub text: String,
    /// `YYYY-MM-DD` publication date, if one was found
    pub date_prefix: Option<String>,
    /// Set when the metadata named a date that could not be read
    pub date_error: Option<DateParseError>,
}

impl CleanedDocument {
    /// Output name: `{date or "undated"}-{stem}.md`.
    pub fn output_file_name(&self, stem: &str) -> String {
        let prefix = self.date_prefix.as_deref().unwrap_or(UNDATED);
        format!("{prefix}-{stem}.md")
    }
}

/// Clean one post.
///
/// `file_name` is only used for the fallback date and error messages.
pub fn transform(file_name: &str, raw: &str) -> Result<CleanedDocument, TransformError> {
    let decoded = html::unescape(raw);
    let split = frontmatter::split_blocks(&decoded);

    let (header, date_prefix, date_error) = match split.metadata() {
        Some(block) => {
            let meta = Metadata::parse(block)
                .map_err(|source| TransformError::MalformedMetadata {
                    file: file_name.to_string(),
                    source,
                })?
                .into_cleaned();

            let (prefix, error) = match meta.date() {
                DateField::Missing => (None, None),
                DateField::Text(text) => match date::date_prefix(&text) {
                    Ok(prefix) => (Some(prefix), None),
                    Err(e) => (None, Some(e)),
                },
                DateField::Unusable => (None, Some(DateParseError("<non-scalar>".into()))),
            };

            let header = meta
                .to_header()
                .map_err(|source| TransformError::Serialize {
                    file: file_name.to_string(),
                    source,
                })?;
            (header, prefix, error)
        }
        None => (
            Metadata::default_header(),
            date::find_date_in_name(file_name).map(str::to_string),
            None,
        ),
    };

    let body = markup::clean_body(&split.body);

    Ok(CleanedDocument {
        text: header + &body,
        date_prefix,
        date_error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_yaml::Value;

    /// Split output into (parsed header, body).
    fn parts(doc: &CleanedDocument) -> (Metadata, &str) {
        let split = frontmatter::split_blocks(&doc.text);
        assert_eq!(split.blocks.len(), 1, "expected exactly one header");
        let rest = doc.text.rsplit_once("---\n\n").unwrap().1;
        (Metadata::parse(split.blocks[0]).unwrap(), rest)
    }

    #[test]
    fn test_table_scenario() {
        let doc = transform(
            "post.md",
            "---\ntitle: T\n---\n<table><tr><td>Hello</td></tr></table>\n",
        )
        .unwrap();
        let (_, body) = parts(&doc);
        assert_eq!(body, "Hello");
    }

    #[test]
    fn test_image_scenario() {
        let doc = transform("post.md", "<p><img src=\"x.png\" alt=\"cat\"></p>").unwrap();
        assert!(doc.text.contains("![cat](x.png)"));
    }

    #[test]
    fn test_metadata_filtered_and_dated() {
        let doc = transform("hello.md", "---\nfoo: bar\ndate: 2021-05-03\ntitle: Hi\n---\nbody").unwrap();
        let (meta, body) = parts(&doc);

        assert_eq!(meta.keys().collect::<Vec<_>>(), ["date", "title", "layout"]);
        assert_eq!(meta.get("layout"), Some(&Value::from("post")));
        assert_eq!(meta.get("date"), Some(&Value::from("2021-05-03")));
        assert_eq!(body, "body");
        assert!(doc.text.contains("layout: post"));
        assert_eq!(doc.date_prefix.as_deref(), Some("2021-05-03"));
        assert_eq!(doc.output_file_name("hello"), "2021-05-03-hello.md");
    }

    #[test]
    fn test_filename_date_without_metadata() {
        let doc = transform("post-2019-12-01-draft.md", "just text").unwrap();
        assert_eq!(doc.text, "---\nlayout: post\n---\n\njust text");
        assert_eq!(doc.date_prefix.as_deref(), Some("2019-12-01"));
        assert_eq!(
            doc.output_file_name("post-2019-12-01-draft"),
            "2019-12-01-post-2019-12-01-draft.md"
        );
    }

    #[test]
    fn test_filename_date_ignored_when_metadata_present() {
        let doc = transform("2019-12-01-post.md", "---\ntitle: x\n---\nbody").unwrap();
        assert_eq!(doc.date_prefix, None);
        assert_eq!(doc.date_error, None);
    }

    #[test]
    fn test_bad_date_is_undated() {
        let doc = transform("post.md", "---\ndate: not-a-date\n---\nbody").unwrap();
        assert_eq!(doc.date_prefix, None);
        assert_eq!(doc.date_error, Some(DateParseError("not-a-date".into())));
        assert_eq!(doc.output_file_name("post"), "undated-post.md");
    }

    #[test]
    fn test_no_date_anywhere_is_undated() {
        let doc = transform("about.md", "about me").unwrap();
        assert_eq!(doc.date_prefix, None);
        assert_eq!(doc.date_error, None);
        assert_eq!(doc.output_file_name("about"), "undated-about.md");
    }

    #[test]
    fn test_date_time_and_zone_ignored() {
        let doc = transform("p.md", "---\ndate: 2021-05-03 23:10:00 -0700\n---\n").unwrap();
        assert_eq!(doc.date_prefix.as_deref(), Some("2021-05-03"));
    }

    #[test]
    fn test_layout_preserved() {
        let doc = transform("p.md", "---\nlayout: page\n---\nx").unwrap();
        let (meta, _) = parts(&doc);
        assert_eq!(meta.get("layout"), Some(&Value::from("page")));
        assert!(!doc.text.contains("layout: post"));
    }

    #[test]
    fn test_only_first_block_honored() {
        let doc = transform(
            "p.md",
            "---\ntitle: First\n---\n---\ntitle: Second\nauthor: x\n---\nbody",
        )
        .unwrap();
        let (meta, body) = parts(&doc);
        assert_eq!(meta.get("title"), Some(&Value::from("First")));
        assert!(meta.get("author").is_none());
        assert_eq!(body, "body");
    }

    #[test]
    fn test_malformed_metadata_is_fatal() {
        let err = transform("broken.md", "---\ntitle: [oops\n---\nbody").unwrap_err();
        assert!(matches!(
            &err,
            TransformError::MalformedMetadata { file, source: MetadataError::Syntax(_) }
                if file == "broken.md"
        ));
        assert!(err.to_string().contains("broken.md"));
    }

    #[test]
    fn test_non_mapping_metadata_is_fatal() {
        let err = transform("list.md", "---\n- a\n- b\n---\nbody").unwrap_err();
        assert!(matches!(
            err,
            TransformError::MalformedMetadata {
                source: MetadataError::NotAMapping(_),
                ..
            }
        ));
    }

    #[test]
    fn test_escaped_markup_is_decoded_then_cleaned() {
        let doc = transform("p.md", "&lt;div&gt;Tom &amp; Jerry&lt;/div&gt;").unwrap();
        assert_eq!(doc.text, "---\nlayout: post\n---\n\nTom & Jerry");
    }

    #[test]
    fn test_comparison_in_prose_keeps_rest_of_post() {
        let doc = transform(
            "p.md",
            "---\ntitle: T\n---\nPrices: x < 3 and y <= 5.\n\nNext paragraph stays.\n",
        )
        .unwrap();
        let (_, body) = parts(&doc);
        assert_eq!(body, "Prices: x < 3 and y <= 5.\n\nNext paragraph stays.");
    }

    #[test]
    fn test_escaped_less_than_keeps_rest_of_post() {
        let doc = transform("p.md", "Use 1 &lt; 2 always. End of post.").unwrap();
        assert_eq!(doc.text, "---\nlayout: post\n---\n\nUse 1 < 2 always. End of post.");
    }

    #[test]
    fn test_wordpress_entities_decoded() {
        let doc = transform("p.md", "It&rsquo;s done&hellip; Tom &amp;amp; Jerry").unwrap();
        assert_eq!(
            doc.text,
            "---\nlayout: post\n---\n\nIt\u{2019}s done\u{2026} Tom & Jerry"
        );
    }

    #[test]
    fn test_second_pass_is_stable() {
        let raw = "---\ntitle: Hi\ndate: 2021-05-03\nwp_id: 9\n---\n\
                   <div class=\"entry\"><table><tr><td>cell</td></tr></table></div>\n\
                   <img src=\"a.png\" alt=\"pic\">\n";
        let first = transform("p.md", raw).unwrap();
        let second = transform("p.md", &first.text).unwrap();

        assert_eq!(frontmatter::split_blocks(&second.text).blocks.len(), 1);
        for tag in markup::WRAPPER_TAGS {
            assert!(!second.text.contains(&format!("<{tag}")));
        }
        assert_eq!(first.text, second.text);
        assert_eq!(first.date_prefix, second.date_prefix);
    }

    #[test]
    fn test_input_untouched() {
        let raw = String::from("---\ntitle: x\n---\n<div>y</div>");
        let copy = raw.clone();
        let _ = transform("p.md", &raw).unwrap();
        assert_eq!(raw, copy);
    }
}
