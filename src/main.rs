/*!
Serve the mock learning platform on localhost.

```text
lms [ config.toml ]
```

With no config file (or no argument), the defaults in `config::Cfg` are
used.
*/
use std::sync::Arc;

use simplelog::{ColorChoice, TerminalMode, TermLogger};
use tokio::sync::RwLock;

use lms::config::{self, Cfg, Glob};
use lms::inter;

const DEFAULT_CONFIG: &str = "config.toml";

fn load() -> Result<Glob, String> {
    let path = std::env::args().nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG.to_owned());

    if std::path::Path::new(&path).exists() {
        config::load_configuration(&path)
    } else {
        log::warn!("No config file {:?}; using defaults.", &path);
        Glob::from_cfg(Cfg::default())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let log_cfg = simplelog::ConfigBuilder::new()
        .add_filter_allow_str("lms")
        .build();
    if let Err(e) = TermLogger::init(
        lms::log_level_from_env(),
        log_cfg,
        TerminalMode::Stdout,
        ColorChoice::Auto
    ) {
        eprintln!("Unable to start logging: {}", &e);
    }
    log::info!("Logging started.");

    let glob = match load() {
        Ok(glob) => glob,
        Err(e) => {
            log::error!("{}", &e);
            std::process::exit(1);
        },
    };

    let addr = glob.addr;
    let static_dir = glob.static_dir.clone();
    let glob = Arc::new(RwLock::new(glob));
    let app = inter::router(glob, static_dir);

    log::info!("Listening on {}", &addr);

    if let Err(e) = axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await
    {
        log::error!("Server error: {}", &e);
        std::process::exit(1);
    }
}
