//! Startup banner and URL display

use super::config::{AppConfig, is_all_interfaces};
use super::constants::APP_NAME;

/// Print the startup banner with URLs and the active model
pub fn print_banner(config: &AppConfig) {
    let host = config.server.host.as_str();
    let port = config.server.port;

    // Use localhost for display when binding to all interfaces
    let display_host = if is_all_interfaces(host) {
        "localhost"
    } else {
        host
    };

    // Label width: "Exhaustion:" plus padding for alignment
    const W: usize = 12;

    println!();
    println!(
        "  \x1b[1m\x1b[36m{}\x1b[0m \x1b[90mv{}\x1b[0m",
        APP_NAME,
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!(
        "  \x1b[32m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m http://{}:{}/query",
        "Query:", display_host, port
    );
    println!(
        "  \x1b[32m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m http://{}:{}/api/docs",
        "Docs:", display_host, port
    );
    println!(
        "  \x1b[33m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m {} \x1b[90m({})\x1b[0m",
        "Model:", config.llm.model, config.llm.base_url
    );
    println!(
        "  \x1b[90m➜  {:<W$} {} attempts, then {}\x1b[0m",
        "Retries:", config.llm.max_attempts, config.llm.on_exhausted
    );

    if host == "127.0.0.1" || host == "localhost" {
        println!(
            "  \x1b[90m➜  {:<W$} use --host 0.0.0.0 to expose\x1b[0m",
            "Network:"
        );
    }

    println!();
}
