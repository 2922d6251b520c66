//! Ticket chat server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin parley-server
//! cargo run --bin parley-server -- --host 0.0.0.0 --port 3000 --accounts accounts.example.json
//! ```

use std::sync::Arc;

use clap::Parser;
use parley_server::{
    config::Config,
    domain::{IdentityProvider, MessageRepository},
    infrastructure::{identity::InMemoryIdentityProvider, repository::InMemoryMessageRepository},
    realtime::{ChatActions, RoomRegistry},
    ui::Server,
    usecase::{
        AcceptConnectionUseCase, CreateMessageUseCase, DeleteMessageUseCase, GetMessagesUseCase,
        UpdateMessageUseCase,
    },
};
use parley_shared::{logger::setup_logger, time::SystemClock};

#[tokio::main]
async fn main() {
    let config = Config::parse();

    // Initialize tracing
    setup_logger(&[env!("CARGO_PKG_NAME"), "tower_http"], &config.log_level);

    // Initialize dependencies in order:
    // 1. Repository / IdentityProvider
    // 2. UseCases
    // 3. Server

    // 1. Ports
    let repository: Arc<dyn MessageRepository> =
        Arc::new(InMemoryMessageRepository::new(Arc::new(SystemClock)));
    let identity = match &config.accounts {
        Some(path) => match InMemoryIdentityProvider::from_file(path) {
            Ok(identity) => identity,
            Err(e) => {
                tracing::error!("{}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => {
            tracing::warn!("No accounts file given, every connection will be rejected");
            InMemoryIdentityProvider::default()
        }
    };
    tracing::info!("Loaded {} accounts", identity.len());
    let identity: Arc<dyn IdentityProvider> = Arc::new(identity);

    // 2. UseCases
    let actions = Arc::new(ChatActions {
        create: Arc::new(CreateMessageUseCase::new(
            repository.clone(),
            identity.clone(),
        )),
        update: Arc::new(UpdateMessageUseCase::new(
            repository.clone(),
            identity.clone(),
        )),
        delete: Arc::new(DeleteMessageUseCase::new(
            repository.clone(),
            identity.clone(),
        )),
    });
    let accept_connection_usecase = Arc::new(AcceptConnectionUseCase::new(
        RoomRegistry::new(),
        identity.clone(),
        actions,
        config.outbox_capacity,
    ));
    let get_messages_usecase = Arc::new(GetMessagesUseCase::new(repository, identity));

    // 3. Create and run the server
    let server = Server::new(accept_connection_usecase, get_messages_usecase);
    if let Err(e) = server.run(config.host, config.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
