//! Reductions applied to raw catalog responses before they reach a view.

use super::types::{CastMember, Credits, MoviePage, MovieSummary, Video, VideoList};

/// Cast members shown on the detail page.
pub const TOP_CAST_LIMIT: usize = 10;

/// Recommendations shown on the detail page.
pub const RECOMMENDATION_LIMIT: usize = 4;

/// Outcome of a trailer lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrailerLookup {
    /// First YouTube trailer in response order.
    Found(Video),
    /// No YouTube trailer among the movie's videos.
    NoTrailer,
}

impl TrailerLookup {
    /// Returns the trailer, if one was found.
    #[must_use]
    pub const fn video(&self) -> Option<&Video> {
        match self {
            Self::Found(video) => Some(video),
            Self::NoTrailer => None,
        }
    }
}

/// First [`TOP_CAST_LIMIT`] cast members in billing order.
#[must_use]
pub fn top_cast(credits: Credits) -> Vec<CastMember> {
    let mut cast = credits.cast;
    cast.truncate(TOP_CAST_LIMIT);
    cast
}

/// First [`RECOMMENDATION_LIMIT`] recommendations in response order.
#[must_use]
pub fn top_recommendations(page: MoviePage) -> Vec<MovieSummary> {
    let mut results = page.results;
    results.truncate(RECOMMENDATION_LIMIT);
    results
}

/// Picks the first `Trailer` hosted on YouTube.
#[must_use]
pub fn select_trailer(videos: VideoList) -> TrailerLookup {
    videos
        .results
        .into_iter()
        .find(Video::is_youtube_trailer)
        .map_or(TrailerLookup::NoTrailer, TrailerLookup::Found)
}
