/*
 * Responsibility
 * - tokio runtime entry point
 * - delegate to app::run() (no logic here)
 */
use security_api::app;
use security_api::error::AppError;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    app::run().await
}
