mod cli;
mod demo;
mod infra;
mod routes;
mod server;

use house_haunt::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
