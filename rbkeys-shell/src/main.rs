use std::env;
use std::io::{self, IsTerminal};

use log::{info, warn, LevelFilter};
use rbkeys::Config;
use simplelog::{ColorChoice, TermLogger, TerminalMode};

mod command;

use command::Shell;

fn log_level() -> LevelFilter {
    match env::var("RBKEYS_LOG") {
        Ok(value) => value.parse().unwrap_or_else(|_| {
            eprintln!("Ignoring RBKEYS_LOG={}, expected off|error|warn|info|debug|trace", value);
            LevelFilter::Warn
        }),
        Err(_) => LevelFilter::Warn,
    }
}

fn tree_config() -> Config {
    let mut config = Config::new();
    if let Ok(value) = env::var("RBKEYS_NODE_LIMIT") {
        match value.parse() {
            Ok(limit) => {
                info!("Limiting the tree to {} nodes", limit);
                config = config.node_limit(limit);
            }
            Err(_) => warn!("Ignoring RBKEYS_NODE_LIMIT={}, not a node count", value),
        }
    }
    config
}

fn main() -> io::Result<()> {
    if let Err(e) = TermLogger::init(
        log_level(),
        simplelog::Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("Could not install the logger: {}", e);
    }

    let stdin = io::stdin();
    let prompt = stdin.is_terminal();
    let mut shell = Shell::new(tree_config(), io::stdout().lock());
    shell.run(stdin.lock(), prompt)
}
