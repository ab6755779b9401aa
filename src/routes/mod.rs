pub mod auth;
pub mod health;
pub mod projects;
pub mod tasks;
pub mod users;

use actix_web::web;

use crate::auth::AuthGate;
use crate::error::AppError;

/// Registers the `/api` routes. Auth requirements are declared per scope:
/// register and login are open, the refresh endpoint demands a
/// refresh-typed token, and everything else demands an access token.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(auth::register)
            .service(auth::login)
            .service(
                web::resource("/refresh")
                    .wrap(AuthGate::refresh())
                    .route(web::post().to(auth::refresh)),
            )
            .service(
                web::resource("/logout")
                    .wrap(AuthGate::access())
                    .route(web::post().to(auth::logout)),
            )
            .service(
                web::resource("/logout/all")
                    .wrap(AuthGate::access())
                    .route(web::post().to(auth::logout_all)),
            ),
    )
    .service(
        web::scope("/projects")
            .wrap(AuthGate::access())
            .service(projects::list_projects)
            .service(projects::create_project)
            .service(projects::list_project_tasks)
            .service(projects::get_project)
            .service(projects::update_project)
            .service(projects::delete_project),
    )
    .service(
        web::scope("/tasks")
            .wrap(AuthGate::access())
            .service(tasks::create_task)
            .service(tasks::get_task)
            .service(tasks::update_task)
            .service(tasks::delete_task),
    )
    .service(
        web::scope("/users")
            .wrap(AuthGate::access())
            .service(users::list_users)
            .service(users::get_user)
            .service(users::update_user)
            .service(users::delete_user),
    );
}

/// JSON extractor configuration: malformed or incomplete bodies produce the
/// standard 400 error envelope instead of actix's plain-text default.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(format!("Invalid request body: {}", err)).into()
    })
}
