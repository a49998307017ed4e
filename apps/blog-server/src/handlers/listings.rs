//! Post listings: the index and category pages.

use actix_web::{HttpRequest, HttpResponse, web};

use blogicum_shared::dto::{CategoryContext, CategoryLink, IndexContext};

use super::views::{page_param, paginated, render};
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /
pub async fn index(state: web::Data<AppState>, req: HttpRequest) -> AppResult<HttpResponse> {
    let page = state.blog.page_request(page_param(&req).as_deref());
    let posts = state.blog.index(page).await?;

    Ok(render(
        "blog/index.html",
        IndexContext {
            page_obj: paginated(posts),
        },
    ))
}

/// GET /category/{slug}/
pub async fn category_posts(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: HttpRequest,
) -> AppResult<HttpResponse> {
    let slug = path.into_inner();
    let page = state.blog.page_request(page_param(&req).as_deref());
    let listing = state.blog.category_posts(&slug, page).await?;

    Ok(render(
        "blog/category.html",
        CategoryContext {
            category: CategoryLink {
                title: listing.category.title.clone(),
                slug: listing.category.slug.clone(),
            },
            description: listing.category.description,
            page_obj: paginated(listing.posts),
        },
    ))
}
