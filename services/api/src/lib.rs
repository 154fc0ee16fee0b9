mod catalog_cli;
mod cli;
mod infra;
mod routes;
mod server;

use melcoffee::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
