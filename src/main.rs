// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Mustekala CLI - Stateless HTTP Proxy Job Executor
//!
//! Runs the proxy service configured from the environment.

use std::env;
use std::process::ExitCode;

use anyhow::Context;

use mustekala::{serve, ProxyConfig};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mustekala=info".parse().unwrap()),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        None | Some("serve") => match run().await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Failed to run proxy: {:#}", e);
                ExitCode::from(1)
            }
        },
        Some("--help") | Some("-h") | Some("help") => {
            print_usage();
            ExitCode::SUCCESS
        }
        Some("--version") | Some("-v") | Some("version") => {
            println!("mustekala {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        Some(cmd) => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            ExitCode::from(1)
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let config = ProxyConfig::from_env().context("loading configuration")?;
    serve(config).await.context("running proxy server")?;
    Ok(())
}

fn print_usage() {
    println!(
        r#"Mustekala - Stateless HTTP Proxy Job Executor

USAGE:
    mustekala [COMMAND]

COMMANDS:
    serve           Run the proxy service (default)
    help            Show this help message
    version         Show version information

ENVIRONMENT:
    MUSTEKALA_BIND                    Listen address (default 127.0.0.1:3041)
    MUSTEKALA_PROXY_DISALLOW_HOSTS    Comma-separated host deny-list
    MUSTEKALA_OWN_HOSTS               This service's public hostnames
    MUSTEKALA_DEBUG                   Empty deny-list, verbose errors

EXAMPLES:
    mustekala serve
    MUSTEKALA_BIND=0.0.0.0:3041 mustekala
    MUSTEKALA_OWN_HOSTS=proxy.example.com mustekala serve

For more information, see: https://github.com/bountyyfi/mustekala
"#
    );
}
