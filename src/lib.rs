pub mod application;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use application::location_relay::LocationRelay;
use application::order_service::OrderService;
use domain::errors::DomainError;
use errors::AppError;
use infrastructure::courier_client::HttpCourierDirectory;
use infrastructure::location_repo::DieselLocationStore;
use infrastructure::notification_client::HttpNotificationDispatcher;
use infrastructure::order_repo::DieselOrderRepository;

pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) {
    let mut conn = pool
        .get()
        .expect("Failed to get DB connection for migrations");
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run database migrations");
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::orders::create_order,
        handlers::orders::get_order,
        handlers::orders::vendor_action,
        handlers::orders::assign_courier,
        handlers::orders::mark_delivered,
        handlers::locations::publish_location,
        handlers::locations::location_history,
        handlers::locations::subscribe_order,
    ),
    components(schemas(
        handlers::orders::CreateOrderRequest,
        handlers::orders::CreateOrderItemRequest,
        handlers::orders::PriceValue,
        handlers::orders::VendorActionRequest,
        handlers::orders::AssignCourierRequest,
        handlers::orders::OrderResponse,
        handlers::orders::OrderItemResponse,
        handlers::orders::OrderEnvelope,
        handlers::locations::PublishLocationRequest,
        handlers::locations::LocationEvent,
        handlers::locations::LocationRecordResponse,
    )),
    tags(
        (name = "orders", description = "Order lifecycle"),
        (name = "locations", description = "Courier position relay"),
    )
)]
pub struct ApiDoc;

/// External collaborators the order core talks to.
pub struct Downstream {
    pub courier_service_url: String,
    pub notification_service_url: String,
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    pool: DbPool,
    downstream: Downstream,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let repo = Arc::new(DieselOrderRepository::new(pool.clone()));
    let couriers = Arc::new(HttpCourierDirectory::new(&downstream.courier_service_url));
    let notifier = Arc::new(HttpNotificationDispatcher::new(
        &downstream.notification_service_url,
    ));
    let order_service = web::Data::new(OrderService::new(repo, couriers, notifier));
    let relay = web::Data::new(LocationRelay::with_store(Arc::new(
        DieselLocationStore::new(pool),
    )));

    Ok(HttpServer::new(move || {
        let json_config = web::JsonConfig::default().error_handler(|err, _req| {
            AppError(DomainError::InvalidInput(err.to_string())).into()
        });

        App::new()
            .app_data(order_service.clone())
            .app_data(relay.clone())
            .app_data(json_config)
            .wrap(Logger::default())
            .service(
                web::scope("/orders")
                    .route("", web::post().to(handlers::orders::create_order))
                    .route("/{id}", web::get().to(handlers::orders::get_order))
                    .route("/{id}/action", web::patch().to(handlers::orders::vendor_action))
                    .route("/{id}/assign", web::patch().to(handlers::orders::assign_courier))
                    .route(
                        "/{id}/delivered",
                        web::patch().to(handlers::orders::mark_delivered),
                    ),
            )
            .service(
                web::scope("/locations")
                    .route("", web::post().to(handlers::locations::publish_location))
                    .route(
                        "/subscribe/{order_id}",
                        web::get().to(handlers::locations::subscribe_order),
                    )
                    .route(
                        "/{user_id}",
                        web::get().to(handlers::locations::location_history),
                    ),
            )
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
