use warp::Filter;

macro_rules! include_static {
    ($($path:expr),* $(,)?) => {
        &[
            $(($path, include_str!(concat!("../static/", $path)))),*
        ]
    };
}

const STATIC_FILES: &[(&str, &str)] = include_static!["css/main.css", "js/app.js"];

fn content_type_from_path(path: &str) -> &'static str {
    match path.rsplit('.').next() {
        Some("css") => "text/css; charset=utf-8",
        Some("js") => "application/javascript; charset=utf-8",
        Some("html") => "text/html; charset=utf-8",
        _ => "text/plain",
    }
}

pub fn find_static_file(path: &str) -> Option<(&'static str, &'static str)> {
    let path = path.trim_start_matches('/');
    STATIC_FILES
        .iter()
        .find(|(file_path, _)| *file_path == path)
        .map(|(file_path, content)| (*content, content_type_from_path(file_path)))
}

pub fn build_static_routes(
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let index_route = warp::path::end().and(warp::get()).map(|| {
        warp::reply::with_header(
            include_str!("../static/index.html"),
            "content-type",
            "text/html; charset=utf-8",
        )
    });

    let file_route = warp::path::full().and(warp::get()).and_then(
        |full_path: warp::path::FullPath| async move {
            match find_static_file(full_path.as_str()) {
                Some((content, content_type)) => Ok::<_, warp::Rejection>(
                    warp::reply::with_header(content, "content-type", content_type),
                ),
                None => Err(warp::reject::not_found()),
            }
        },
    );

    index_route.or(file_route)
}
