pub mod error;
pub mod tmdb;
pub mod trakt;
pub mod traits;

pub use error::SourceError;
pub use tmdb::{ImageSet, ImageTarget, TmdbClient};
pub use trakt::{TraktClient, UserProfile};
pub use traits::{ApiResponse, AuthenticatedRequest, ImageCatalog};
