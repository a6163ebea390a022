/*!
Structs to hold configuration data and application state.
*/
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use handlebars::Handlebars;
use serde::Deserialize;
use tokio::sync::broadcast::{self, error::TryRecvError};

use crate::{
    catalog::Catalog,
    session::{DEFAULT_SESSION_KEY, Event, Notice, SessionStore},
    storage::FileStorage,
    user::{Directory, Identity},
};

#[derive(Deserialize)]
struct ConfigFile {
    storage_dir: Option<String>,
    session_key: Option<String>,
    users_file: Option<String>,
    templates_dir: Option<String>,
    static_dir: Option<String>,
    host: Option<String>,
    port: Option<u16>,
}

#[derive(Debug)]
pub struct Cfg {
    /// Where `FileStorage` keeps the persisted session.
    pub storage_dir: PathBuf,
    pub session_key: String,
    /// CSV of identities to use instead of the three mock ones.
    pub users_file: Option<PathBuf>,
    pub templates_dir: PathBuf,
    pub static_dir: PathBuf,
    pub addr: SocketAddr,
}

impl std::default::Default for Cfg {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from("data/storage"),
            session_key: DEFAULT_SESSION_KEY.to_owned(),
            users_file: None,
            templates_dir: PathBuf::from("templates"),
            static_dir: PathBuf::from("static"),
            addr: SocketAddr::new(
                IpAddr::V4(Ipv4Addr::LOCALHOST),
                8001
            ),
        }
    }
}

impl Cfg {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path = path.as_ref();
        let file_contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Unable to read config file: {}", &e))?;
        let cf: ConfigFile = toml::from_str(&file_contents)
            .map_err(|e| format!("Unable to deserialize config file: {}", &e))?;

        let mut c = Self::default();

        if let Some(s) = cf.storage_dir {
            c.storage_dir = PathBuf::from(s);
        }
        if let Some(s) = cf.session_key {
            c.session_key = s;
        }
        if let Some(s) = cf.users_file {
            c.users_file = Some(PathBuf::from(s));
        }
        if let Some(s) = cf.templates_dir {
            c.templates_dir = PathBuf::from(s);
        }
        if let Some(s) = cf.static_dir {
            c.static_dir = PathBuf::from(s);
        }
        if let Some(s) = cf.host {
            c.addr.set_ip(
                s.parse().map_err(|e| format!(
                    "Error parsing {:?} as IP address: {}",
                    &s, &e
                ))?
            );
        }
        if let Some(n) = cf.port {
            c.addr.set_port(n);
        }

        Ok(c)
    }
}

/**
Everything the request handlers need, constructed once at startup and
passed to them in an `axum::Extension`.
*/
pub struct Glob {
    pub catalog: Catalog,
    pub sessions: SessionStore<FileStorage>,
    pub templates: Handlebars<'static>,
    pub addr: SocketAddr,
    pub static_dir: PathBuf,
    events: broadcast::Receiver<Event>,
}

impl Glob {
    /// Build state from an already-read configuration; also restores any
    /// persisted session.
    pub fn from_cfg(cfg: Cfg) -> Result<Glob, String> {
        log::trace!("Glob::from_cfg( {:?} ) called.", &cfg);

        let directory = match &cfg.users_file {
            Some(path) => {
                let f = std::fs::File::open(path).map_err(|e| format!(
                    "Unable to open users file {}: {}", path.display(), &e
                ))?;
                let idents = Identity::vec_from_csv_reader(f).map_err(|e| format!(
                    "Error reading users file {}: {}", path.display(), &e
                ))?;
                log::info!("Read {} identities from {}.", idents.len(), path.display());
                Directory::new(idents)
            },
            None => Directory::mock(),
        };

        let catalog = Catalog::mock();
        log::info!(
            "Catalog holds {} courses and {} assignments.",
            catalog.courses().len(), catalog.assignments().len()
        );

        let mut sessions = SessionStore::new(
            FileStorage::new(&cfg.storage_dir),
            &cfg.session_key,
            directory
        );
        if sessions.restore() {
            log::info!("Restored persisted session.");
        }
        let events = sessions.subscribe();

        let mut templates = Handlebars::new();
        #[cfg(debug_assertions)]
        templates.set_dev_mode(true);
        templates.register_templates_directory(".html", &cfg.templates_dir)
            .map_err(|e| format!(
                "Error registering templates directory {}: {}",
                cfg.templates_dir.display(), &e
            ))?;

        Ok(Glob {
            catalog,
            sessions,
            templates,
            addr: cfg.addr,
            static_dir: cfg.static_dir,
            events,
        })
    }

    /// Notices for every session event since the last call.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        let mut notices = Vec::new();
        loop {
            match self.events.try_recv() {
                Ok(evt) => { notices.push(evt.notice()); },
                Err(TryRecvError::Lagged(n)) => {
                    log::warn!("Dropped {} session events.", &n);
                },
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => { break; },
            }
        }
        notices
    }
}

/// Loads system configuration and builds the application state.
pub fn load_configuration<P: AsRef<Path>>(path: P) -> Result<Glob, String> {
    let cfg = Cfg::from_file(path.as_ref())?;
    log::info!("Configuration file read:\n{:#?}", &cfg);
    Glob::from_cfg(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::ensure_logging;
    use crate::user::Role;

    use serial_test::serial;

    #[test]
    fn config_overlays_defaults() {
        ensure_logging();
        let cfg = Cfg::from_file("test/good_config_0.toml").unwrap();
        log::trace!("{:#?}", &cfg);
        assert_eq!(cfg.session_key, "lms-test-user");
        assert_eq!(cfg.users_file, Some(PathBuf::from("test/good_identities_0.csv")));
        assert_eq!(cfg.static_dir, PathBuf::from("static"));
        assert_eq!(cfg.addr, "0.0.0.0:8123".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn bad_config() {
        ensure_logging();
        let estr = Cfg::from_file("test/bad_config_0.toml").unwrap_err();
        assert!(estr.contains("IP address"));
        assert!(Cfg::from_file("test/no_such_config.toml").is_err());
    }

    #[tokio::test]
    #[serial]
    async fn glob_from_config() {
        ensure_logging();
        let _ = std::fs::remove_dir_all("test/storage_cfg");

        let mut glob = load_configuration("test/good_config_0.toml").unwrap();
        assert_eq!(glob.sessions.directory().len(), 3);
        assert!(!glob.sessions.is_authenticated());
        assert!(glob.take_notices().is_empty());

        glob.sessions.login("grace@example.com", "x", Role::Teacher).await.unwrap();
        glob.sessions.logout().await;
        let notices = glob.take_notices();
        let titles: Vec<&str> = notices.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, ["Login Successful", "Logged Out"]);
        assert!(glob.take_notices().is_empty());

        let _ = std::fs::remove_dir_all("test/storage_cfg");
    }

    #[test]
    fn missing_users_file() {
        let cfg = Cfg {
            users_file: Some(PathBuf::from("test/no_such_users.csv")),
            ..Default::default()
        };
        let estr = match Glob::from_cfg(cfg) {
            Err(e) => e,
            Ok(_) => panic!("missing users file should be an error"),
        };
        assert!(estr.contains("no_such_users.csv"));
    }
}
