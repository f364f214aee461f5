use log::{error, info, warn};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;

use crate::client::handle_client;
use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::protocol::Response;
use crate::storage::SandboxRoot;

pub struct Server {
    listener: TcpListener,
    root: Arc<SandboxRoot>,
    config: Arc<ServerConfig>,
    slots: Arc<Semaphore>,
}

impl Server {
    /// Resolves the sandbox root and binds the request listener. Either
    /// failure is fatal.
    pub async fn bind(config: ServerConfig, root: SandboxRoot) -> Result<Self, ServerError> {
        let root_path = root.resolve()?;
        info!("Server root directory: {}", root_path.display());

        let socket = config.listen_socket();
        let listener = match TcpListener::bind(&socket).await {
            Ok(listener) => {
                info!("Server bound to {}", socket);
                listener
            }
            Err(e) => {
                error!("Failed to bind to {}: {}", socket, e);
                return Err(e.into());
            }
        };

        Ok(Self {
            listener,
            root: Arc::new(root),
            slots: Arc::new(Semaphore::new(config.max_clients)),
            config: Arc::new(config),
        })
    }

    /// Address the listener actually bound to
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub async fn start(&self) {
        info!(
            "Starting RAX file manager on {} (max {} clients)",
            self.config.listen_socket(),
            self.config.max_clients
        );

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let Ok(permit) = Arc::clone(&self.slots).try_acquire_owned() else {
                        let limit = self.config.max_clients;
                        tokio::spawn(async move {
                            if let Err(e) = reject_busy(stream, limit).await {
                                warn!("Failed to reject client {}: {}", addr, e);
                            }
                        });
                        continue;
                    };

                    info!(
                        "Accepted client: {} ({}/{} clients)",
                        addr,
                        self.config.max_clients - self.slots.available_permits(),
                        self.config.max_clients
                    );

                    let root = Arc::clone(&self.root);
                    let config = Arc::clone(&self.config);

                    // Spawn a task for each client so accept loop doesn't block
                    tokio::spawn(async move {
                        handle_client(stream, addr, root, config).await;
                        drop(permit);
                    });
                }
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                }
            }
        }
    }
}

async fn reject_busy(mut stream: TcpStream, limit: usize) -> io::Result<()> {
    warn!("Rejecting connection, {} clients already connected", limit);
    let response = Response::error(&ServerError::Busy(limit));
    stream.write_all(response.to_line().as_bytes()).await?;
    stream.shutdown().await
}
