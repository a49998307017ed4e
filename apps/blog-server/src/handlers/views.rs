//! Building documents out of domain values.

use actix_web::{HttpRequest, HttpResponse, http::header, web};
use serde::{Deserialize, Serialize};
use url::Url;

use blogicum_core::domain::{CommentView, PostId, PostListing, User};
use blogicum_core::pagination::Page;
use blogicum_core::service;
use blogicum_shared::Document;
use blogicum_shared::dto::{
    CategoryLink, Choice, CommentItem, FormChoices, PageMeta, Paginated, PostCard, ProfileView,
};

/// 200 with the document for `template`.
pub fn render<T: Serialize>(template: &str, context: T) -> HttpResponse {
    HttpResponse::Ok().json(Document::new(template, context))
}

/// 302 to `location`.
pub fn redirect(location: impl AsRef<str>) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location.as_ref()))
        .finish()
}

pub fn post_url(id: PostId) -> String {
    format!("/posts/{id}/")
}

pub fn profile_url(username: &str) -> String {
    site_path(["profile", username])
}

/// Site path made of percent-encoded `segments`, with a trailing slash.
fn site_path<'a>(segments: impl IntoIterator<Item = &'a str>) -> String {
    let Ok(mut url) = Url::parse("http://localhost/") else {
        return "/".to_string();
    };
    if let Ok(mut path) = url.path_segments_mut() {
        path.clear().extend(segments).push("");
    }
    url.path().to_string()
}

#[derive(Debug, Deserialize)]
struct PageQuery {
    page: Option<String>,
}

/// Raw `page` query value. A malformed query string counts as absent.
pub fn page_param(req: &HttpRequest) -> Option<String> {
    web::Query::<PageQuery>::from_query(req.query_string())
        .ok()
        .and_then(|q| q.into_inner().page)
}

pub fn post_card(listing: &PostListing) -> PostCard {
    let post = &listing.post;
    PostCard {
        id: post.id,
        title: post.title.clone(),
        text: post.text.clone(),
        pub_date: post.pub_date,
        image: post.image.clone(),
        is_published: post.is_published,
        author: listing.author_username.clone(),
        category: listing.category.as_ref().map(|c| CategoryLink {
            title: c.title.clone(),
            slug: c.slug.clone(),
        }),
        location: listing.location_name.clone(),
        comment_count: listing.comment_count,
    }
}

pub fn comment_item(view: &CommentView) -> CommentItem {
    CommentItem {
        id: view.comment.id,
        text: view.comment.text.clone(),
        created_at: view.comment.created_at,
        author: view.author_username.clone(),
    }
}

pub fn profile_view(user: &User) -> ProfileView {
    ProfileView {
        username: user.username.clone(),
        full_name: user.display_name(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        bio: user.bio.clone(),
        joined: user.created_at,
    }
}

pub fn paginated(page: Page<PostListing>) -> Paginated<PostCard> {
    let meta = PageMeta {
        number: page.number,
        num_pages: page.num_pages,
        count: page.count,
        has_next: page.has_next,
        has_previous: page.has_previous,
    };
    Paginated {
        items: page.items.iter().map(post_card).collect(),
        page: meta,
    }
}

pub fn choices(choices: service::FormChoices) -> FormChoices {
    FormChoices {
        categories: choices
            .categories
            .iter()
            .map(|c| Choice {
                id: c.id,
                label: c.to_string(),
            })
            .collect(),
        locations: choices
            .locations
            .iter()
            .map(|l| Choice {
                id: l.id,
                label: l.to_string(),
            })
            .collect(),
    }
}
