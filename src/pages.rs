use axum::response::Html;

/// GET /
pub async fn home() -> Html<&'static str> {
    Html("<h1>Hello World</h1>")
}

/// GET /contact
pub async fn contact() -> Html<&'static str> {
    Html("<h1>Contact View</h1>")
}

/// GET /about
pub async fn about() -> Html<&'static str> {
    Html("<h1>About</h1><p>Rooms, a product catalog and a small blog.</p>")
}

/// GET /social
pub async fn social() -> Html<&'static str> {
    Html("<h1>Social</h1>")
}
