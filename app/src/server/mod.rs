pub mod api;
pub mod router;
pub mod state;

pub use state::SharedState;

use anyhow::Result;

/// Start the axum HTTP server and run until Ctrl+C.
pub async fn start_server(state: SharedState) -> Result<()> {
    let port = state.server_port();
    let app = router::create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Label server listening on http://{}", addr);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {e}");
            }
            tracing::info!("Shutting down...");
        })
        .await?;

    Ok(())
}
