//! Notification server demo
//!
//! Run with: cargo run --example notify_server [BIND_ADDR]
//!
//! Examples:
//!   cargo run --example notify_server                  # binds to 127.0.0.1:3000
//!   cargo run --example notify_server 0.0.0.0:3001     # binds to 0.0.0.0:3001
//!
//! Starts the server with a seeded item store and inserts a new item every
//! few seconds. Each insert is streamed to every connected subscriber as a
//! length-prefixed JSON frame.
//!
//! ## Subscribing
//!
//! Any TCP client works; frames are a 4-byte big-endian length followed by
//! the payload:
//!   nc localhost 3000 | xxd

use std::net::SocketAddr;
use std::time::Duration;

use notify_hub::feed::{ItemStore, NewItem, SEED_ITEMS};
use notify_hub::{NotifyServer, ServerConfig};

const INSERT_INTERVAL: Duration = Duration::from_secs(3);

/// Parse bind address from command line argument
///
/// Accepts "IP:PORT", "IP" (port 3000) or "localhost[:PORT]".
fn parse_bind_addr(arg: &str) -> Result<SocketAddr, String> {
    const DEFAULT_PORT: u16 = 3000;

    let normalized = arg.replace("localhost", "127.0.0.1");

    if let Ok(addr) = normalized.parse::<SocketAddr>() {
        return Ok(addr);
    }

    if let Ok(ip) = normalized.parse::<std::net::IpAddr>() {
        return Ok(SocketAddr::new(ip, DEFAULT_PORT));
    }

    Err(format!(
        "Invalid bind address: '{}'. Expected format: IP:PORT or IP or 'localhost'",
        arg
    ))
}

fn print_usage() {
    eprintln!("Usage: notify_server [BIND_ADDR]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  BIND_ADDR    Address to bind to (default: 127.0.0.1:3000)");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    let mut config = ServerConfig::default();
    if let Some(addr_str) = args.get(1) {
        match parse_bind_addr(addr_str) {
            Ok(addr) => config = config.bind(addr),
            Err(e) => {
                eprintln!("Error: {}", e);
                eprintln!();
                print_usage();
                std::process::exit(1);
            }
        }
    }

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("notify_hub=debug".parse()?)
                .add_directive("notify_server=debug".parse()?),
        )
        .init();

    let server = NotifyServer::bind(config).await?;
    println!("Subscribe with: nc {} | xxd", server.local_addr()?);

    let store = ItemStore::seeded(server.handle());

    // Simulated writer: restock a seed item every few seconds
    let writer = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(INSERT_INTERVAL);
        ticker.tick().await;

        for round in 1.. {
            ticker.tick().await;
            let (name, quantity) = SEED_ITEMS[round % SEED_ITEMS.len()];

            match store.insert(NewItem::new(name, quantity + round as i32)).await {
                Ok(item) => tracing::info!(id = item.id, name = %item.name, "Published item"),
                Err(e) => {
                    tracing::error!(error = %e, "Insert failed");
                    break;
                }
            }
        }
    });

    tokio::select! {
        result = server.run() => {
            if let Err(e) = result {
                eprintln!("Server error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            println!("\nShutting down...");
        }
    }

    writer.abort();
    Ok(())
}
