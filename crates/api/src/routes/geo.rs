//! Route definitions for the geographic taxonomy.

use axum::routing::get;
use axum::Router;

use crate::handlers::geo;
use crate::state::AppState;

/// Routes mounted at `/geo`. Reads are public, writes need a superuser.
///
/// ```text
/// GET, POST   /country                -> list_countries, create_country
/// GET, DELETE /country/{id}           -> get_country, delete_country
/// GET, POST   /region?country=        -> list_regions, create_region
/// GET, DELETE /region/{id}            -> get_region, delete_region
/// GET, POST   /city?region=           -> list_cities, create_city
/// GET, DELETE /city/{id}              -> get_city, delete_city
/// GET, POST   /subway_branch?city=    -> list_subway_branches, create_subway_branch
/// GET, DELETE /subway_branch/{id}     -> get_subway_branch, delete_subway_branch
/// GET, POST   /subway?branch=         -> list_subways, create_subway
/// GET, DELETE /subway/{id}            -> get_subway, delete_subway
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/country", get(geo::list_countries).post(geo::create_country))
        .route("/country/{id}", get(geo::get_country).delete(geo::delete_country))
        .route("/region", get(geo::list_regions).post(geo::create_region))
        .route("/region/{id}", get(geo::get_region).delete(geo::delete_region))
        .route("/city", get(geo::list_cities).post(geo::create_city))
        .route("/city/{id}", get(geo::get_city).delete(geo::delete_city))
        .route(
            "/subway_branch",
            get(geo::list_subway_branches).post(geo::create_subway_branch),
        )
        .route(
            "/subway_branch/{id}",
            get(geo::get_subway_branch).delete(geo::delete_subway_branch),
        )
        .route("/subway", get(geo::list_subways).post(geo::create_subway))
        .route("/subway/{id}", get(geo::get_subway).delete(geo::delete_subway))
}
