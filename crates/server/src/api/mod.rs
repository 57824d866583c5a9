pub mod categories;
pub mod common;
pub mod doc;
pub mod health;
pub mod packages;
pub mod upload;

use serde::Serialize;
use utoipa::ToSchema;

pub use categories::categories_list;
pub use health::health;
pub use packages::{packages_create, packages_delete, packages_get, packages_list, packages_search};
pub use upload::upload;

/// Error body returned by every failing endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}
