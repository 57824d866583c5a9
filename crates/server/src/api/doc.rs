//! OpenAPI documentation aggregator, served via Scalar UI at `/docs`.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "coverdesk API",
        version = "0.1.0",
        description = "Insurance package catalogue with file upload reconciliation.",
    ),
    tags(
        (name = "Health", description = "Server readiness"),
        (name = "Upload", description = "JSON / CSV / XLSX package upload with conflict detection"),
        (name = "Packages", description = "Package listing, lookup, search, creation and deletion"),
        (name = "Categories", description = "Package categories"),
    ),
    paths(
        crate::api::health::health,
        crate::api::upload::upload,
        crate::api::packages::packages_list,
        crate::api::packages::packages_get,
        crate::api::packages::packages_search,
        crate::api::packages::packages_create,
        crate::api::packages::packages_delete,
        crate::api::categories::categories_list,
    ),
    components(schemas(
        crate::api::ErrorResponse,
        crate::api::health::HealthResponse,
        crate::api::upload::UploadResponse,
        crate::api::packages::CreatePackageResponse,
    ))
)]
pub struct ApiDoc;
