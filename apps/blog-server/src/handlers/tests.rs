use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use chrono::TimeDelta;
use serde_json::Value;

use blogicum_core::Repositories;
use blogicum_core::domain::{Category, NewCategory, NewUser, User};
use blogicum_core::forms::PUB_DATE_INPUT_FORMAT;
use blogicum_core::ports::{
    BaseRepository, CategoryRepository, Clock, TokenService, UserRepository,
};
use blogicum_infra::{InMemoryStore, JwtConfig, JwtTokenService, ManualClock};

use super::configure_routes;
use crate::middleware::auth::SESSION_COOKIE;
use crate::observability::RequestIdMiddleware;
use crate::state::AppState;

struct Fixture {
    state: AppState,
    repos: Repositories,
    clock: Arc<ManualClock>,
}

impl Fixture {
    fn new() -> Self {
        let clock = Arc::new(ManualClock::default());
        let repos = Arc::new(InMemoryStore::with_clock(clock.clone())).repositories();
        let tokens = Arc::new(JwtTokenService::new(JwtConfig::default()));
        Self {
            state: AppState::from_parts(repos.clone(), clock.clone(), 10, tokens),
            repos,
            clock,
        }
    }

    async fn user(&self, username: &str) -> User {
        self.repos
            .users
            .create(NewUser {
                username: username.to_string(),
                email: String::new(),
                password_hash: "!".to_string(),
            })
            .await
            .unwrap()
    }

    async fn category(&self, slug: &str, is_published: bool) -> Category {
        self.repos
            .categories
            .create(NewCategory {
                title: slug.to_string(),
                description: format!("All about {slug}"),
                slug: slug.to_string(),
                is_published,
            })
            .await
            .unwrap()
    }

    fn session(&self, user: &User) -> Cookie<'static> {
        let token = self
            .state
            .tokens
            .generate_token(user.id, &user.username)
            .unwrap();
        Cookie::new(SESSION_COOKIE, token)
    }
}

macro_rules! app {
    ($fixture:expr) => {
        test::init_service(
            App::new()
                .wrap(RequestIdMiddleware)
                .app_data(web::Data::new($fixture.state.clone()))
                .configure(configure_routes),
        )
        .await
    };
}

fn location<B>(resp: &actix_web::dev::ServiceResponse<B>) -> &str {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

#[actix_web::test]
async fn test_index_renders_document() {
    let fixture = Fixture::new();
    let app = app!(fixture);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["template"], "blog/index.html");
    assert_eq!(body["context"]["page_obj"]["page"]["num_pages"], 1);
}

#[actix_web::test]
async fn test_anonymous_create_redirects_to_login() {
    let fixture = Fixture::new();
    let app = app!(fixture);

    let req = test::TestRequest::post()
        .uri("/posts/create/")
        .set_form([("title", "Hi"), ("text", "There")])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/auth/login/?next=/posts/create/");
}

#[actix_web::test]
async fn test_create_post_then_view_it() {
    let fixture = Fixture::new();
    let ada = fixture.user("ada").await;
    let travel = fixture.category("travel", true).await;
    let app = app!(fixture);

    let category = travel.id.to_string();
    let req = test::TestRequest::post()
        .uri("/posts/create/")
        .cookie(fixture.session(&ada))
        .set_form([
            ("title", "Alps"),
            ("text", "Snow everywhere"),
            ("category", category.as_str()),
            ("is_published", "on"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/profile/ada/");

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    let body: Value = test::read_body_json(resp).await;
    let items = body["context"]["page_obj"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["author"], "ada");
    assert_eq!(items[0]["category"]["slug"], "travel");

    let id = items[0]["id"].as_i64().unwrap();
    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri(&format!("/posts/{id}/")).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["template"], "blog/detail.html");
    assert!(body["context"]["form"].is_null());
}

#[actix_web::test]
async fn test_invalid_post_form_is_rerendered() {
    let fixture = Fixture::new();
    let ada = fixture.user("ada").await;
    let app = app!(fixture);

    let req = test::TestRequest::post()
        .uri("/posts/create/")
        .cookie(fixture.session(&ada))
        .set_form([("title", ""), ("text", "Body")])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["template"], "blog/create.html");
    assert!(body["context"]["errors"]["title"].is_array());
    assert!(body["context"]["errors"]["category"].is_array());
}

#[actix_web::test]
async fn test_scheduled_post_is_not_found_until_published() {
    let fixture = Fixture::new();
    let ada = fixture.user("ada").await;
    let travel = fixture.category("travel", true).await;
    let app = app!(fixture);

    let pub_date = (fixture.clock.now() + TimeDelta::hours(1))
        .format(PUB_DATE_INPUT_FORMAT)
        .to_string();
    let category = travel.id.to_string();
    let req = test::TestRequest::post()
        .uri("/posts/create/")
        .cookie(fixture.session(&ada))
        .set_form([
            ("title", "Soon"),
            ("text", "Wait for it"),
            ("category", category.as_str()),
            ("pub_date", pub_date.as_str()),
            ("is_published", "on"),
        ])
        .to_request();
    test::call_service(&app, req).await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/posts/1/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], 404);

    // The author still sees it.
    let req = test::TestRequest::get()
        .uri("/posts/1/")
        .cookie(fixture.session(&ada))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    fixture.clock.advance(TimeDelta::hours(2));
    let resp = test::call_service(&app, test::TestRequest::get().uri("/posts/1/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_non_author_edit_redirects_without_change() {
    let fixture = Fixture::new();
    let ada = fixture.user("ada").await;
    let bob = fixture.user("bob").await;
    let travel = fixture.category("travel", true).await;
    let app = app!(fixture);

    let category = travel.id.to_string();
    let req = test::TestRequest::post()
        .uri("/posts/create/")
        .cookie(fixture.session(&ada))
        .set_form([
            ("title", "Original"),
            ("text", "Body"),
            ("category", category.as_str()),
            ("is_published", "on"),
        ])
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/posts/1/edit/")
        .cookie(fixture.session(&bob))
        .set_form([
            ("title", "Hijacked"),
            ("text", "Body"),
            ("category", category.as_str()),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/posts/1/");

    let req = test::TestRequest::post()
        .uri("/posts/1/delete/")
        .cookie(fixture.session(&bob))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(location(&resp), "/posts/1/");

    let post = fixture.repos.posts.find_by_id(1).await.unwrap().unwrap();
    assert_eq!(post.title, "Original");
}

#[actix_web::test]
async fn test_comments_shown_oldest_first() {
    let fixture = Fixture::new();
    let ada = fixture.user("ada").await;
    let bob = fixture.user("bob").await;
    let travel = fixture.category("travel", true).await;
    let app = app!(fixture);

    let category = travel.id.to_string();
    let req = test::TestRequest::post()
        .uri("/posts/create/")
        .cookie(fixture.session(&ada))
        .set_form([
            ("title", "Talk"),
            ("text", "Body"),
            ("category", category.as_str()),
            ("is_published", "on"),
        ])
        .to_request();
    test::call_service(&app, req).await;

    for (user, text) in [(&bob, "first"), (&ada, "second")] {
        let req = test::TestRequest::post()
            .uri("/posts/1/comment/")
            .cookie(fixture.session(user))
            .set_form([("text", text)])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(location(&resp), "/posts/1/");
        fixture.clock.advance(TimeDelta::seconds(1));
    }

    // Blank comments bounce back to the post without being stored.
    let req = test::TestRequest::post()
        .uri("/posts/1/comment/")
        .cookie(fixture.session(&bob))
        .set_form([("text", "   ")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(location(&resp), "/posts/1/");

    let req = test::TestRequest::get()
        .uri("/posts/1/")
        .cookie(fixture.session(&bob))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    let comments = body["context"]["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0]["text"], "first");
    assert_eq!(comments[0]["author"], "bob");
    assert_eq!(comments[1]["text"], "second");
    assert_eq!(body["context"]["post"]["comment_count"], 2);
    assert!(body["context"]["form"].is_object());
}

#[actix_web::test]
async fn test_unpublished_category_is_not_found() {
    let fixture = Fixture::new();
    fixture.category("secret", false).await;
    let app = app!(fixture);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/category/secret/").to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_category_page_renders_its_posts() {
    let fixture = Fixture::new();
    let ada = fixture.user("ada").await;
    let travel = fixture.category("travel", true).await;
    let food = fixture.category("food", true).await;
    let app = app!(fixture);

    for (title, category) in [("Alps", &travel), ("Soup", &food)] {
        let category = category.id.to_string();
        let req = test::TestRequest::post()
            .uri("/posts/create/")
            .cookie(fixture.session(&ada))
            .set_form([
                ("title", title),
                ("text", "Body"),
                ("category", category.as_str()),
                ("is_published", "on"),
            ])
            .to_request();
        test::call_service(&app, req).await;
    }

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/category/travel/").to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["template"], "blog/category.html");
    assert_eq!(body["context"]["category"]["slug"], "travel");
    assert_eq!(body["context"]["description"], "All about travel");
    let items = body["context"]["page_obj"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "Alps");
    assert_eq!(items[0]["comment_count"], 0);
}

#[actix_web::test]
async fn test_page_parameter_is_forgiving() {
    let fixture = Fixture::new();
    let app = app!(fixture);

    for uri in ["/?page=abc", "/?page=0", "/?page=99"] {
        let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK, "{uri}");
    }

    let resp = test::call_service(&app, test::TestRequest::get().uri("/?page=abc").to_request()).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["context"]["page_obj"]["page"]["number"], 1);
}

#[actix_web::test]
async fn test_unknown_route_is_problem_document() {
    let fixture = Fixture::new();
    let app = app!(fixture);

    let req = test::TestRequest::get()
        .uri("/no/such/page/")
        .insert_header(("x-request-id", "trace-123"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        resp.headers().get("x-request-id").and_then(|v| v.to_str().ok()),
        Some("trace-123")
    );
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["request_id"], "trace-123");
    assert_eq!(body["template"], "pages/404.html");
}

#[actix_web::test]
async fn test_register_login_and_use_session() {
    let fixture = Fixture::new();
    let app = app!(fixture);

    let req = test::TestRequest::post()
        .uri("/auth/registration/")
        .set_form([
            ("username", "carol"),
            ("email", "carol@example.com"),
            ("password", "long-enough"),
            ("password_confirmation", "long-enough"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/");

    let req = test::TestRequest::post()
        .uri("/auth/login/")
        .set_form([
            ("username", "carol"),
            ("password", "wrong-password"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/auth/login/")
        .set_form([
            ("username", "carol"),
            ("password", "long-enough"),
            ("next", "/profile/edit/"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/profile/edit/");
    let session = resp
        .response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .map(Cookie::into_owned)
        .unwrap();

    let req = test::TestRequest::get()
        .uri("/profile/edit/")
        .cookie(session)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["context"]["form"]["username"], "carol");
}

#[actix_web::test]
async fn test_profile_rename_redirects_to_new_page() {
    let fixture = Fixture::new();
    let ada = fixture.user("ada").await;
    let app = app!(fixture);

    let req = test::TestRequest::post()
        .uri("/profile/edit/")
        .cookie(fixture.session(&ada))
        .set_form([
            ("first_name", "Ada"),
            ("last_name", "Lovelace"),
            ("username", "countess"),
            ("email", "ada@example.com"),
            ("bio", ""),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/profile/countess/");

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/profile/countess/").to_request(),
    )
    .await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["context"]["profile"]["full_name"], "Ada Lovelace");
}

#[actix_web::test]
async fn test_health_reports_memory_store() {
    let fixture = Fixture::new();
    let app = app!(fixture);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage"], "memory");
}

#[actix_web::test]
async fn test_static_pages() {
    let fixture = Fixture::new();
    let app = app!(fixture);

    for (uri, template) in [
        ("/pages/about/", "pages/about.html"),
        ("/pages/rules/", "pages/rules.html"),
    ] {
        let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["template"], template);
    }
}

#[actix_web::test]
async fn test_unicode_rename_redirects_to_encoded_profile() {
    let fixture = Fixture::new();
    let ada = fixture.user("ada").await;
    let app = app!(fixture);

    let req = test::TestRequest::post()
        .uri("/profile/edit/")
        .cookie(fixture.session(&ada))
        .set_form([
            ("first_name", ""),
            ("last_name", ""),
            ("username", "Аня"),
            ("email", "ada@example.com"),
            ("bio", ""),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/profile/%D0%90%D0%BD%D1%8F/");

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/profile/%D0%90%D0%BD%D1%8F/")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["context"]["profile"]["username"], "Аня");
}
