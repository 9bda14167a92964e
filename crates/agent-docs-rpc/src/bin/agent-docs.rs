use agent_docs::{DocumentRegistry, SyncConfig};
use agent_docs_rpc::AgentDocumentServer;
use std::io;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let env_filter = EnvFilter::try_from_env("AGENT_DOCS_LOG")
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // stdout carries protocol frames.
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    init_tracing();

    let config = SyncConfig::from_env();
    tracing::info!(?config, "starting agent-docs");
    let mut server = AgentDocumentServer::new(DocumentRegistry::new(config));

    let stdin = io::stdin();
    let stdout = io::stdout();
    match server.serve(stdin.lock(), stdout.lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "server stopped");
            ExitCode::FAILURE
        }
    }
}
