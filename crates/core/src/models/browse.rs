use serde::{Deserialize, Serialize};

use super::Movie;

/// Which listing the browse view is currently paging through
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum QueryMode {
    Trending,
    Search {
        query: String,
    },
    Discover {
        genre_id: Option<i32>,
        min_rating: Option<f64>,
    },
}

impl QueryMode {
    /// Resolves raw inputs into a mode. A non-empty search query wins over
    /// discover filters; with neither set the default listing is trending.
    pub fn resolve(search_query: &str, genre_id: Option<i32>, min_rating: Option<f64>) -> Self {
        let query = search_query.trim();
        if !query.is_empty() {
            QueryMode::Search {
                query: query.to_string(),
            }
        } else if genre_id.is_some() || min_rating.is_some() {
            QueryMode::Discover {
                genre_id,
                min_rating,
            }
        } else {
            QueryMode::Trending
        }
    }
}

/// Observable copy of the browse state handed to subscribers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowseSnapshot {
    pub mode: QueryMode,
    pub search_query: String,
    pub genre_id: Option<i32>,
    pub min_rating: Option<f64>,
    pub page: u32,
    pub items: Vec<Movie>,
    pub loading: bool,
    pub has_more: bool,
    pub favorites_view: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_precedence() {
        assert_eq!(QueryMode::resolve("", None, None), QueryMode::Trending);
        assert_eq!(QueryMode::resolve("   ", None, None), QueryMode::Trending);
        assert_eq!(
            QueryMode::resolve("", Some(28), None),
            QueryMode::Discover {
                genre_id: Some(28),
                min_rating: None
            }
        );
        assert_eq!(
            QueryMode::resolve(" alien ", Some(28), Some(7.0)),
            QueryMode::Search {
                query: "alien".into()
            }
        );
    }

    #[test]
    fn test_mode_serializes_tagged() {
        let json = serde_json::to_value(QueryMode::Search {
            query: "dune".into(),
        })
        .unwrap();
        assert_eq!(json["kind"], "search");
        assert_eq!(json["query"], "dune");
    }
}
