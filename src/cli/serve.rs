use crate::{config::Settings, error, info, server};

pub async fn serve(settings: Settings) {
    info!("Listening on {}", settings.server_address);
    if let Err(e) = server::serve(settings).await {
        error!("Server stopped. Err: {}", e);
    }
}
