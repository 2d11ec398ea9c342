//! Route definitions for executor profiles and the records describing
//! their work.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{executor, executor_details};
use crate::state::AppState;

/// Routes mounted at `/executor`.
///
/// ```text
/// GET, POST           /profile                            -> list_profiles (filters), create_profile
/// GET, PATCH, DELETE  /profile/{id}                       -> get_profile, update_profile, delete_profile
/// POST                /verification                       -> create_verification
/// GET, POST           /{executor_id}/feedback             -> list_feedback, create_feedback
/// GET, PATCH, DELETE  /{executor_id}/feedback/{id}        -> get_feedback, update_feedback, delete_feedback
/// POST                /{executor_id}/feedback/{id}/answer -> answer_feedback
///
/// GET, POST           /experience?executor=               -> list_experience, create_experience
/// GET, PATCH, DELETE  /experience/{id}
/// GET, POST           /experience_file?experience=        -> list_experience_files, create_experience_file
/// GET, PATCH, DELETE  /experience_file/{id}
/// GET, POST           /service?executor=                  -> list_services, create_service
/// GET, PATCH, DELETE  /service/{id}
/// GET, POST           /portfolio?executor=                -> list_portfolio, create_portfolio
/// GET, PATCH, DELETE  /portfolio/{id}
/// GET, POST           /address?executor=                  -> list_addresses, create_address
/// GET, PATCH, DELETE  /address/{id}
/// GET, POST           /geo?executor=                      -> list_geos, create_geo
/// GET, PATCH, DELETE  /geo/{id}
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/profile",
            get(executor::list_profiles).post(executor::create_profile),
        )
        .route(
            "/profile/{id}",
            get(executor::get_profile)
                .patch(executor::update_profile)
                .delete(executor::delete_profile),
        )
        .route("/verification", post(executor::create_verification))
        .route(
            "/{executor_id}/feedback",
            get(executor::list_feedback).post(executor::create_feedback),
        )
        .route(
            "/{executor_id}/feedback/{id}",
            get(executor::get_feedback)
                .patch(executor::update_feedback)
                .delete(executor::delete_feedback),
        )
        .route(
            "/{executor_id}/feedback/{id}/answer",
            post(executor::answer_feedback),
        )
        .merge(details_router())
}

fn details_router() -> Router<AppState> {
    use executor_details as d;

    Router::new()
        .route(
            "/experience",
            get(d::list_experience).post(d::create_experience),
        )
        .route(
            "/experience/{id}",
            get(d::get_experience)
                .patch(d::update_experience)
                .delete(d::delete_experience),
        )
        .route(
            "/experience_file",
            get(d::list_experience_files).post(d::create_experience_file),
        )
        .route(
            "/experience_file/{id}",
            get(d::get_experience_file)
                .patch(d::update_experience_file)
                .delete(d::delete_experience_file),
        )
        .route("/service", get(d::list_services).post(d::create_service))
        .route(
            "/service/{id}",
            get(d::get_service)
                .patch(d::update_service)
                .delete(d::delete_service),
        )
        .route(
            "/portfolio",
            get(d::list_portfolio).post(d::create_portfolio),
        )
        .route(
            "/portfolio/{id}",
            get(d::get_portfolio)
                .patch(d::update_portfolio)
                .delete(d::delete_portfolio),
        )
        .route("/address", get(d::list_addresses).post(d::create_address))
        .route(
            "/address/{id}",
            get(d::get_address)
                .patch(d::update_address)
                .delete(d::delete_address),
        )
        .route("/geo", get(d::list_geos).post(d::create_geo))
        .route(
            "/geo/{id}",
            get(d::get_geo).patch(d::update_geo).delete(d::delete_geo),
        )
}
