//! Book catalog access: the catalog seam, volume payloads, and the shapes
//! handed back to clients.

pub mod google;
pub mod recommend;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Read-only volume search against a third-party catalog.
#[async_trait]
pub trait BookCatalog: Send + Sync {
    /// Single attempt; results keep the catalog's order.
    async fn search_volumes(&self, query: &str, max_results: u32) -> Result<Vec<VolumeInfo>>;
}

/// Top-level volumes search payload. `items` is absent when nothing matched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VolumesResponse {
    #[serde(default)]
    pub items: Vec<VolumeItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VolumeItem {
    #[serde(rename = "volumeInfo", default)]
    pub volume_info: VolumeInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeInfo {
    pub title: Option<String>,
    pub authors: Option<Vec<String>>,
    pub description: Option<String>,
    pub image_links: Option<ImageLinks>,
    pub preview_link: Option<String>,
    pub info_link: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ImageLinks {
    pub thumbnail: Option<String>,
}

impl VolumeInfo {
    pub fn thumbnail(&self) -> Option<&str> {
        self.image_links.as_ref()?.thumbnail.as_deref()
    }

    fn joined_authors(&self) -> Option<String> {
        self.authors.as_ref().map(|a| a.join(", "))
    }
}

/// Recommendation card: authors joined into one display string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookSummary {
    pub title: Option<String>,
    pub author: String,
    pub link: Option<String>,
    pub thumbnail: Option<String>,
}

impl From<VolumeInfo> for BookSummary {
    fn from(info: VolumeInfo) -> Self {
        Self {
            author: info.joined_authors().unwrap_or_default(),
            thumbnail: info.thumbnail().map(str::to_string),
            title: info.title,
            link: info.info_link,
        }
    }
}

/// Category search row with placeholder text for missing fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookListing {
    pub title: String,
    pub author: String,
    pub link: String,
}

impl From<VolumeInfo> for BookListing {
    fn from(info: VolumeInfo) -> Self {
        let author = match info.authors.as_deref() {
            Some(authors) if !authors.is_empty() => authors.join(", "),
            Some(_) => String::new(),
            None => "Unknown Author".to_string(),
        };
        Self {
            title: info.title.unwrap_or_else(|| "Unknown Title".to_string()),
            author,
            link: info.info_link.unwrap_or_else(|| "#".to_string()),
        }
    }
}

/// Detailed volume record with the author list kept intact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeDetail {
    pub title: Option<String>,
    pub authors: Option<Vec<String>>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    pub preview_link: Option<String>,
    pub info_link: Option<String>,
}

impl From<VolumeInfo> for VolumeDetail {
    fn from(info: VolumeInfo) -> Self {
        Self {
            thumbnail: info.thumbnail().map(str::to_string),
            title: info.title,
            authors: info.authors,
            description: info.description,
            preview_link: info.preview_link,
            info_link: info.info_link,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "kind": "books#volumes",
        "totalItems": 2,
        "items": [
            {
                "id": "a1",
                "volumeInfo": {
                    "title": "Thinking, Fast and Slow",
                    "authors": ["Daniel Kahneman"],
                    "description": "Two systems.",
                    "imageLinks": {"smallThumbnail": "s", "thumbnail": "http://img/a1"},
                    "previewLink": "http://preview/a1",
                    "infoLink": "http://info/a1"
                }
            },
            {
                "id": "b2",
                "volumeInfo": {
                    "authors": ["Ann One", "Bob Two"]
                }
            }
        ]
    }"#;

    fn parse_sample() -> Vec<VolumeInfo> {
        let response: VolumesResponse = serde_json::from_str(SAMPLE).unwrap();
        response.items.into_iter().map(|i| i.volume_info).collect()
    }

    #[test]
    fn test_missing_items_is_empty() {
        let response: VolumesResponse =
            serde_json::from_str(r#"{"kind": "books#volumes", "totalItems": 0}"#).unwrap();
        assert!(response.items.is_empty());
    }

    #[test]
    fn test_summary_shape() {
        let books: Vec<BookSummary> = parse_sample().into_iter().map(Into::into).collect();
        assert_eq!(books[0].title.as_deref(), Some("Thinking, Fast and Slow"));
        assert_eq!(books[0].author, "Daniel Kahneman");
        assert_eq!(books[0].thumbnail.as_deref(), Some("http://img/a1"));
        assert_eq!(books[0].link.as_deref(), Some("http://info/a1"));

        assert_eq!(books[1].title, None);
        assert_eq!(books[1].author, "Ann One, Bob Two");
        assert_eq!(books[1].thumbnail, None);
    }

    #[test]
    fn test_listing_placeholders() {
        let listing = BookListing::from(VolumeInfo::default());
        assert_eq!(listing.title, "Unknown Title");
        assert_eq!(listing.author, "Unknown Author");
        assert_eq!(listing.link, "#");
    }

    #[test]
    fn test_detail_keeps_author_list() {
        let detail = VolumeDetail::from(parse_sample().remove(1));
        assert_eq!(
            detail.authors,
            Some(vec!["Ann One".to_string(), "Bob Two".to_string()])
        );
        let json = serde_json::to_value(VolumeDetail::from(parse_sample().remove(0))).unwrap();
        assert_eq!(json["previewLink"], "http://preview/a1");
        assert_eq!(json["infoLink"], "http://info/a1");
    }
}
