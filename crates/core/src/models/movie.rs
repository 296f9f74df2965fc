use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

/// A movie as returned by TMDB listing endpoints (trending, search, discover)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u32,
    #[serde(default)]
    pub genre_ids: Vec<i32>,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub original_language: String,
    #[serde(default)]
    pub original_title: String,
    #[serde(default)]
    pub adult: bool,
    #[serde(default)]
    pub video: bool,
}

impl Movie {
    pub fn release_year(&self) -> Option<i32> {
        self.release_date.map(|d| d.year())
    }

    /// Average rating with one decimal, as shown on cards
    pub fn rating_label(&self) -> String {
        format!("{:.1}", self.vote_average)
    }
}

/// Full movie record from `/movie/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetails {
    #[serde(flatten)]
    pub movie: Movie,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub budget: i64,
    #[serde(default)]
    pub revenue: i64,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub tagline: String,
}

impl MovieDetails {
    pub fn genre_names(&self) -> Vec<&str> {
        self.genres.iter().map(|g| g.name.as_str()).collect()
    }

    /// Runtime formatted as `2h 15m`; `None` when unknown or zero
    pub fn runtime_label(&self) -> Option<String> {
        match self.runtime {
            Some(minutes) if minutes > 0 => Some(format!("{}h {}m", minutes / 60, minutes % 60)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: i32,
    pub name: String,
}

/// One page of a paginated TMDB listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoviePage {
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub results: Vec<Movie>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
}

fn first_page() -> u32 {
    1
}

impl MoviePage {
    pub fn empty(page: u32) -> Self {
        Self {
            page,
            results: Vec::new(),
            total_pages: 0,
            total_results: 0,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenreList {
    pub genres: Vec<Genre>,
}

// TMDB sends "" for unknown dates and occasionally partial values
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_movie_from_listing_json() {
        let movie: Movie = serde_json::from_value(json!({
            "id": 550,
            "title": "Fight Club",
            "overview": "An insomniac office worker...",
            "poster_path": "/pB8BM7pdSp6B6Ih7QZ4DrQ3PmJK.jpg",
            "backdrop_path": null,
            "release_date": "1999-10-15",
            "vote_average": 8.433,
            "vote_count": 26280,
            "genre_ids": [18],
            "popularity": 61.4,
            "original_language": "en",
            "original_title": "Fight Club",
            "adult": false,
            "video": false
        }))
        .unwrap();

        assert_eq!(movie.id, 550);
        assert_eq!(movie.release_year(), Some(1999));
        assert_eq!(movie.rating_label(), "8.4");
        assert!(movie.backdrop_path.is_none());
    }

    #[test]
    fn test_invalid_or_missing_release_date() {
        let empty: Movie =
            serde_json::from_value(json!({ "id": 1, "title": "A", "release_date": "" })).unwrap();
        assert!(empty.release_date.is_none());

        let partial: Movie =
            serde_json::from_value(json!({ "id": 2, "title": "B", "release_date": "2024" }))
                .unwrap();
        assert!(partial.release_date.is_none());

        let missing: Movie = serde_json::from_value(json!({ "id": 3, "title": "C" })).unwrap();
        assert!(missing.release_date.is_none());
        assert!(missing.genre_ids.is_empty());
    }

    #[test]
    fn test_snapshot_survives_reserialization() {
        let movie: Movie = serde_json::from_value(json!({
            "id": 7,
            "title": "Seven",
            "release_date": "1995-09-22"
        }))
        .unwrap();

        let stored = serde_json::to_string(&movie).unwrap();
        let restored: Movie = serde_json::from_str(&stored).unwrap();
        assert_eq!(restored, movie);
    }

    #[test]
    fn test_details_flatten_and_labels() {
        let details: MovieDetails = serde_json::from_value(json!({
            "id": 27205,
            "title": "Inception",
            "release_date": "2010-07-15",
            "vote_average": 8.4,
            "genres": [{ "id": 28, "name": "Action" }, { "id": 878, "name": "Science Fiction" }],
            "runtime": 148,
            "budget": 160000000,
            "revenue": 825532764,
            "status": "Released",
            "tagline": "Your mind is the scene of the crime."
        }))
        .unwrap();

        assert_eq!(details.movie.id, 27205);
        assert_eq!(details.genre_names(), vec!["Action", "Science Fiction"]);
        assert_eq!(details.runtime_label().as_deref(), Some("2h 28m"));
        assert_eq!(details.budget, 160_000_000);
    }

    #[test]
    fn test_runtime_label_unknown() {
        let details: MovieDetails =
            serde_json::from_value(json!({ "id": 1, "title": "Short", "runtime": 0 })).unwrap();
        assert!(details.runtime_label().is_none());
    }
}
