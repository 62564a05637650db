//! Catalog API client (listings, detail, credits, recommendations, videos, search).

mod api;
mod client;
pub mod images;
mod normalize;
pub mod types;

#[allow(clippy::module_name_repetitions)]
pub use api::{CatalogApi, LocalCatalogApi};
#[allow(clippy::module_name_repetitions)]
pub use client::{CatalogClient, CatalogClientBuilder, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use normalize::{
    RECOMMENDATION_LIMIT, TOP_CAST_LIMIT, TrailerLookup, select_trailer, top_cast,
    top_recommendations,
};
pub use types::{
    CastMember, CatalogRequest, Credits, Genre, MovieCategory, MovieDetails, MoviePage,
    MovieSummary, UnknownCategory, Video, VideoList,
};
