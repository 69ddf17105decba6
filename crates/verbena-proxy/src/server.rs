use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::ProxyConfig;
use crate::error::ProxyError;
use crate::forward::ProxyState;
use crate::routes::router;

/// Bind `config.bind` and serve until `cancel` fires.
pub async fn serve(config: ProxyConfig, cancel: CancellationToken) -> Result<(), ProxyError> {
  let state = ProxyState::new(&config.backend_url)?;
  let listener = TcpListener::bind(config.bind)
    .await
    .map_err(|source| ProxyError::Bind {
      addr: config.bind,
      source,
    })?;
  serve_on(listener, state, cancel).await
}

/// Serve on an already bound listener until `cancel` fires.
///
/// In-flight requests are allowed to finish before this returns.
pub async fn serve_on(
  listener: TcpListener,
  state: ProxyState,
  cancel: CancellationToken,
) -> Result<(), ProxyError> {
  let addr = listener.local_addr().map_err(ProxyError::Serve)?;
  info!(%addr, backend_url = %state.backend_url(), "proxy listening");

  axum::serve(listener, router(state))
    .with_graceful_shutdown(async move {
      cancel.cancelled().await;
      info!("proxy shutting down");
    })
    .await
    .map_err(ProxyError::Serve)?;

  info!("proxy stopped");
  Ok(())
}
