pub mod api;

use crate::cli::Args;
use crate::service::ChatService;
use self::api::{ cors_layer, create_router, AppState };
use std::error::Error;
use std::io::ErrorKind;
use std::sync::Arc;
use tokio::net::TcpListener;
use log::{ info, error };

pub struct Server {
    addr: String,
    service: Arc<ChatService>,
    args: Args,
}

impl Server {
    pub fn new(service: Arc<ChatService>, args: Args) -> Self {
        let addr = format!("{}:{}", args.bind_host, args.port);
        Self { addr, service, args }
    }

    pub async fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let state = AppState {
            service: Arc::clone(&self.service),
            port: self.args.port,
        };
        let app = create_router(state).layer(cors_layer(&self.args.cors_origins));

        let listener = match TcpListener::bind(self.addr.as_str()).await {
            Ok(listener) => listener,
            Err(e) if e.kind() == ErrorKind::AddrInUse => {
                error!(
                    "Port {} is already in use. Stop the process holding it or set PORT to a different value.",
                    self.args.port
                );
                return Err(Box::new(e));
            }
            Err(e) => {
                error!("Failed to bind HTTP server to {}: {}", self.addr, e);
                return Err(Box::new(e));
            }
        };

        info!("Server is running on port {}", self.args.port);
        info!("API available at http://{}", listener.local_addr()?);
        axum::serve(listener, app.into_make_service()).await?;

        Ok(())
    }
}
