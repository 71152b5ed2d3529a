//! Record model representing one catalog article.

use serde::{Deserialize, Serialize};

/// A bibliographic record from the catalog
///
/// Records are created once when the corpus is loaded and never mutated.
/// Identity is the `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Unique, stable identifier
    pub id: String,

    /// Article title
    pub title: String,

    /// Author names, in byline order
    #[serde(default)]
    pub authors: Vec<String>,

    /// Abstract text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#abstract: Option<String>,

    /// Short keyword phrases
    #[serde(default)]
    pub keywords: Vec<String>,

    /// Publication year
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i64>,

    /// Journal volume
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<i64>,

    /// Issue number within the volume
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue: Option<i64>,

    /// Direct PDF URL (passed through untouched)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<String>,

    /// Article landing page URL (passed through untouched)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub article_url: Option<String>,
}

impl Record {
    /// Create a new record with required fields
    pub fn new(id: String, title: String) -> Self {
        Self {
            id,
            title,
            authors: Vec::new(),
            r#abstract: None,
            keywords: Vec::new(),
            year: None,
            volume: None,
            issue: None,
            pdf_url: None,
            article_url: None,
        }
    }

    /// Abstract text, or an empty string when absent
    pub fn abstract_text(&self) -> &str {
        self.r#abstract.as_deref().unwrap_or_default()
    }

    /// Authors joined for display, `Unknown` when the byline is empty
    pub fn author_line(&self) -> String {
        if self.authors.is_empty() {
            "Unknown".to_string()
        } else {
            self.authors.join(", ")
        }
    }

    /// "Vol. 9, No. 1" style citation label, if a volume is known
    pub fn volume_label(&self) -> Option<String> {
        self.volume.map(|volume| match self.issue {
            Some(issue) => format!("Vol. {}, No. {}", volume, issue),
            None => format!("Vol. {}", volume),
        })
    }

    /// Check if record has a downloadable PDF
    pub fn has_pdf(&self) -> bool {
        self.pdf_url.is_some()
    }
}

/// Builder for constructing Record objects
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    record: Record,
}

impl RecordBuilder {
    /// Create a new builder with required fields
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            record: Record::new(id.into(), title.into()),
        }
    }

    /// Set authors
    pub fn authors<I, S>(mut self, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.record.authors = authors.into_iter().map(Into::into).collect();
        self
    }

    /// Set abstract
    pub fn abstract_text(mut self, abstract_text: impl Into<String>) -> Self {
        self.record.r#abstract = Some(abstract_text.into());
        self
    }

    /// Set keywords
    pub fn keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.record.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Set publication year
    pub fn year(mut self, year: i64) -> Self {
        self.record.year = Some(year);
        self
    }

    /// Set volume
    pub fn volume(mut self, volume: i64) -> Self {
        self.record.volume = Some(volume);
        self
    }

    /// Set issue
    pub fn issue(mut self, issue: i64) -> Self {
        self.record.issue = Some(issue);
        self
    }

    /// Set PDF URL
    pub fn pdf_url(mut self, url: impl Into<String>) -> Self {
        self.record.pdf_url = Some(url.into());
        self
    }

    /// Set article page URL
    pub fn article_url(mut self, url: impl Into<String>) -> Self {
        self.record.article_url = Some(url.into());
        self
    }

    /// Build the Record
    pub fn build(self) -> Record {
        self.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_builder() {
        let record = RecordBuilder::new("412", "Deep Learning for Networks")
            .authors(["John Doe", "Jane Smith"])
            .abstract_text("This is a test abstract.")
            .keywords(["deep learning", "networks"])
            .year(2020)
            .volume(9)
            .issue(1)
            .pdf_url("https://example.com/412.pdf")
            .build();

        assert_eq!(record.id, "412");
        assert_eq!(record.title, "Deep Learning for Networks");
        assert_eq!(record.authors, vec!["John Doe", "Jane Smith"]);
        assert_eq!(record.year, Some(2020));
        assert!(record.has_pdf());
        assert!(record.article_url.is_none());
    }

    #[test]
    fn test_author_line() {
        let record = RecordBuilder::new("1", "Test")
            .authors(["John Doe", "Jane Smith", "Bob Jones"])
            .build();
        assert_eq!(record.author_line(), "John Doe, Jane Smith, Bob Jones");

        let anonymous = Record::new("2".to_string(), "Test".to_string());
        assert_eq!(anonymous.author_line(), "Unknown");
    }

    #[test]
    fn test_volume_label() {
        let with_issue = RecordBuilder::new("1", "Test").volume(9).issue(2).build();
        assert_eq!(with_issue.volume_label().as_deref(), Some("Vol. 9, No. 2"));

        let volume_only = RecordBuilder::new("1", "Test").volume(9).build();
        assert_eq!(volume_only.volume_label().as_deref(), Some("Vol. 9"));

        let neither = RecordBuilder::new("1", "Test").issue(2).build();
        assert_eq!(neither.volume_label(), None);
    }

    #[test]
    fn test_camel_case_serialization() {
        let record = RecordBuilder::new("1", "Test")
            .pdf_url("https://example.com/1.pdf")
            .build();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["pdfUrl"], "https://example.com/1.pdf");
        assert!(json.get("articleUrl").is_none());
    }
}
