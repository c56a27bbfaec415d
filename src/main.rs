use delivery_order_service::{build_server, create_pool, run_migrations, Downstream};
use dotenvy::dotenv;
use std::env;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .expect("PORT must be a valid number");
    let downstream = Downstream {
        courier_service_url: env::var("COURIER_SERVICE_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:5003".to_string()),
        notification_service_url: env::var("NOTIFICATION_SERVICE_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:5005".to_string()),
    };

    let pool = create_pool(&database_url);
    run_migrations(&pool);

    log::info!("Starting server at http://{}:{}", host, port);

    build_server(pool, downstream, &host, port)?.await
}
