//! HTTP handlers and route configuration.

mod auth;
mod comments;
mod health;
mod listings;
mod pages;
mod posts;
mod profiles;
mod views;

#[cfg(test)]
mod tests;

use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        .route("/", web::get().to(listings::index))
        .route("/category/{slug}/", web::get().to(listings::category_posts))
        // `edit` must win over the `{username}` pattern.
        .service(
            web::resource("/profile/edit/")
                .route(web::get().to(profiles::edit_profile_form))
                .route(web::post().to(profiles::edit_profile)),
        )
        .route("/profile/{username}/", web::get().to(profiles::profile))
        .service(
            web::scope("/posts")
                .service(
                    web::resource("/create/")
                        .route(web::get().to(posts::create_form))
                        .route(web::post().to(posts::create)),
                )
                .route("/{id}/", web::get().to(posts::detail))
                .service(
                    web::resource("/{id}/edit/")
                        .route(web::get().to(posts::edit_form))
                        .route(web::post().to(posts::edit)),
                )
                .service(
                    web::resource("/{id}/delete/")
                        .route(web::get().to(posts::delete_form))
                        .route(web::post().to(posts::delete)),
                )
                .route("/{id}/comment/", web::post().to(comments::add))
                .service(
                    web::resource("/{id}/edit_comment/{comment_id}/")
                        .route(web::get().to(comments::edit_form))
                        .route(web::post().to(comments::edit)),
                )
                .service(
                    web::resource("/{id}/delete_comment/{comment_id}/")
                        .route(web::get().to(comments::delete_form))
                        .route(web::post().to(comments::delete)),
                ),
        )
        .service(
            web::scope("/auth")
                .service(
                    web::resource("/registration/")
                        .route(web::get().to(auth::registration_form))
                        .route(web::post().to(auth::register)),
                )
                .service(
                    web::resource("/login/")
                        .route(web::get().to(auth::login_form))
                        .route(web::post().to(auth::login)),
                )
                .route("/logout/", web::post().to(auth::logout)),
        )
        .service(
            web::scope("/pages")
                .route("/about/", web::get().to(pages::about))
                .route("/rules/", web::get().to(pages::rules)),
        )
        .default_service(web::to(pages::not_found));
}
