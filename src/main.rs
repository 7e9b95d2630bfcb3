use std::{net::TcpListener, sync::Arc};
use storefront::{
    build_app, get_configuration,
    payments::StripeGateway,
    startup::{check_database, get_connection_pool, run_migrations, StartupError},
    telemetry::{generate_subscriber, init_subscriber},
};
use tracing::{error, info};

#[actix_rt::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = generate_subscriber("storefront".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber)?;

    let configuration = get_configuration()?;
    info!(env = %configuration.env, "loaded configuration");

    if let Err(e) = start(configuration).await {
        error!(err = %e, "storefront failed");
        return Err(e.into());
    }
    Ok(())
}

async fn start(configuration: storefront::configuration::Settings) -> Result<(), StartupError> {
    let connection = get_connection_pool(&configuration.database);
    check_database(&connection).await?;
    run_migrations(&connection).await?;

    let gateway = Arc::new(StripeGateway::new(&configuration.payments)?);

    let addr = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(&addr)?;
    info!(%addr, "listening");

    build_app(listener, connection, configuration, gateway)?.await?;
    Ok(())
}
