use utoipa::OpenApi;

use super::api::catalog::CatalogResponse;
use super::api::error::ErrorResponse;
use super::api::interlink::{
    InitialPositions, InterlinkRequest, InterlinkResponse, InterlinkWindow, ValidateTleRequest,
    ValidateTleResponse,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::api::interlink::calculate_interlink,
        super::api::interlink::validate_tle,
        super::api::catalog::list_satellites,
        super::api::catalog::reload_satellites,
    ),
    components(
        schemas(
            InterlinkRequest,
            InterlinkResponse,
            InterlinkWindow,
            InitialPositions,
            ValidateTleRequest,
            ValidateTleResponse,
            CatalogResponse,
            ErrorResponse,
            crate::interlink::Position,
            crate::interlink::Geodetic,
            crate::interlink::SatelliteInfo,
        )
    ),
    info(
        title = "Sat-Interlink API",
        description = "Line-of-sight and range windows between pairs of satellites",
        version = "0.1.0"
    ),
    tags(
        (name = "interlink", description = "Interlink window search and TLE validation"),
        (name = "catalog", description = "Satellites loaded from the TLE folder")
    )
)]
pub struct ApiDoc;
