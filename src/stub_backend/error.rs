use crate::domain_model::ApiEnvelope;
use crate::logger::*;
use std::convert::Infallible;
use warp::Rejection;
use warp::http::StatusCode;

pub async fn recover_error(err: Rejection) -> Result<impl warp::Reply, Infallible> {
    let (status, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "route introuvable".to_string())
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, format!("corps invalide: {}", e))
    } else if err.find::<warp::reject::UnsupportedMediaType>().is_some() {
        (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "corps JSON attendu".to_string(),
        )
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            "méthode non autorisée".to_string(),
        )
    } else {
        warn!("Unhandled rejection: {:?}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Unhandled error: {:?}", err),
        )
    };

    let json = warp::reply::json(&ApiEnvelope::<()>::err(message));
    Ok(warp::reply::with_status(json, status))
}
