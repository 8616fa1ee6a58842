use super::handler;
use super::state::StubState;
use std::convert::Infallible;
use std::sync::Arc;
use warp::Filter;

pub fn routes(
    state: Arc<StubState>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let login = warp::post()
        .and(warp::path!("auth" / "login"))
        .and(warp::body::json())
        .and(with(state.clone()))
        .and_then(handler::login);

    let register = warp::post()
        .and(warp::path!("auth" / "register"))
        .and(warp::body::json())
        .and(with(state.clone()))
        .and_then(handler::register);

    let refresh = warp::post()
        .and(warp::path!("auth" / "refresh"))
        .and(warp::body::json())
        .and(with(state.clone()))
        .and_then(handler::refresh);

    let logout = warp::post()
        .and(warp::path!("auth" / "logout"))
        .and(warp::body::json())
        .and(with(state.clone()))
        .and_then(handler::logout);

    let me = warp::get()
        .and(warp::path!("auth" / "me"))
        .and(with_authorization())
        .and(with(state.clone()))
        .and_then(handler::me);

    let list_favorites = warp::get()
        .and(warp::path!("favorites"))
        .and(with_authorization())
        .and(with(state.clone()))
        .and_then(handler::list_favorites);

    let add_favorite = warp::post()
        .and(warp::path!("favorites"))
        .and(warp::body::json())
        .and(with_authorization())
        .and(with(state.clone()))
        .and_then(handler::add_favorite);

    let remove_favorite = warp::delete()
        .and(warp::path!("favorites" / String / String))
        .and(with_authorization())
        .and(with(state.clone()))
        .and_then(handler::remove_favorite);

    let partner_establishments = warp::get()
        .and(warp::path!("partner" / "establishments"))
        .and(with_authorization())
        .and(with(state))
        .and_then(handler::partner_establishments);

    login
        .or(register)
        .or(refresh)
        .or(logout)
        .or(me)
        .or(list_favorites)
        .or(add_favorite)
        .or(remove_favorite)
        .or(partner_establishments)
}

fn with<T>(value: Arc<T>) -> impl Filter<Extract = (Arc<T>,), Error = Infallible> + Clone
where
    T: Send + Sync + ?Sized,
{
    warp::any().map(move || value.clone())
}

fn with_authorization() -> impl Filter<Extract = (Option<String>,), Error = warp::Rejection> + Clone
{
    warp::header::optional::<String>("authorization")
}
