use anyhow::Context;
use clap::{Parser, Subcommand};
use kagami::config::Config;
use kagami::options::OptionRegistry;
use kagami::proxy::EdgeProxy;
use kagami::rewrite::{RewriteResponse, Rewriter};
use kagami::store::ConfigStore;
use pingora::server::configuration::Opt;
use pingora::server::Server;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "kagami")]
#[command(version, about = "Edge canonicalizer and re-signer for image processing URLs", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the edge proxy
    Serve {
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        #[arg(short = 'd', long)]
        daemon: bool,

        #[arg(long)]
        test: bool,

        #[arg(long)]
        upgrade: bool,
    },
    /// Rewrite a single request path and print the result
    Rewrite {
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Request path, e.g. /unsigned/resize:fit:300/plain/http://host/a.jpg
        path: String,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    match args.command {
        Command::Serve {
            config,
            daemon,
            test,
            upgrade,
        } => serve(config, daemon, test, upgrade),
        Command::Rewrite { config, path } => rewrite(config, &path),
    }
}

fn load_config(path: &PathBuf) -> anyhow::Result<Config> {
    let config = Config::from_file(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;

    kagami::logging::init_subscriber(&config.logging)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging subsystem: {}", e))?;

    tracing::info!(
        config_file = %path.display(),
        server_address = %config.server.address,
        server_port = config.server.port,
        upstream = %config.upstream.endpoint,
        store = ?config.store.kind,
        extended_options = config.options.extended,
        "Configuration loaded successfully"
    );

    Ok(config)
}

fn serve(config_path: PathBuf, daemon: bool, test: bool, upgrade: bool) -> anyhow::Result<()> {
    let config = load_config(&config_path)?;
    let store: Arc<dyn ConfigStore> = Arc::from(kagami::store::from_config(&config)?);

    let opt = Opt {
        daemon,
        test,
        upgrade,
        ..Default::default()
    };

    let mut server = Server::new(Some(opt))
        .map_err(|e| anyhow::anyhow!("Failed to create Pingora server: {}", e))?;
    server.bootstrap();

    let proxy = EdgeProxy::new(&config, store)
        .map_err(|e| anyhow::anyhow!("Failed to create proxy: {}", e))?;

    let mut proxy_service = pingora_proxy::http_proxy_service(&server.configuration, proxy);
    proxy_service.threads = Some(config.server.threads);

    let listen_addr = config.server.listen_addr();
    proxy_service.add_tcp(&listen_addr);

    tracing::info!(
        address = %listen_addr,
        threads = config.server.threads,
        "Starting Kagami edge proxy"
    );

    server.add_service(proxy_service);

    server.run_forever();
}

fn rewrite(config_path: PathBuf, path: &str) -> anyhow::Result<()> {
    let config = load_config(&config_path)?;
    let store = kagami::store::from_config(&config)?;
    let rewriter = Rewriter::new(Arc::new(OptionRegistry::new(config.options.extended)));

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let response = runtime.block_on(rewriter.handle(store.as_ref(), &config.store.config_key, path));

    match response {
        RewriteResponse::Rewrite { path } => {
            println!("{}", path);
            Ok(())
        }
        RewriteResponse::Forbidden { status, message } => {
            anyhow::bail!("{} Forbidden: {}", status, message)
        }
    }
}
