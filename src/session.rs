/*!
The session store: who is logged in, and keeping that across restarts.

There is exactly one `Session` per `SessionStore`, and the store is the
only thing that changes it. Every change goes out as an `Event` on a
broadcast channel; the store itself never touches the UI.

NOTE: `login()` performs no credential verification whatsoever. Any
non-empty secret is accepted for any known email/role pair. This is a
stand-in for a real credential check and must not be used as the basis of
anything that needs actual authentication.
*/
use rand::{Rng, distributions::Alphanumeric};
use serde::Serialize;
use time::OffsetDateTime;
use tokio::sync::broadcast;

use crate::route::Route;
use crate::storage::Storage;
use crate::user::{default_avatar, Directory, Identity, Role};

pub const DEFAULT_SESSION_KEY: &str = "lms-user";

const EVENT_CAPACITY: usize = 16;
const ID_SUFFIX_LENGTH: usize = 4;

/// The current identity, if any.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Session {
    identity: Option<Identity>,
}

impl Session {
    pub fn with_identity(identity: Identity) -> Self {
        Self { identity: Some(identity) }
    }

    pub fn identity(&self) -> Option<&Identity> { self.identity.as_ref() }

    pub fn is_authenticated(&self) -> bool { self.identity.is_some() }
}

#[derive(Clone, Debug, PartialEq)]
pub enum AuthError {
    /// Some required field was empty.
    Validation(String),
    /// No known identity with that email and role.
    Credential,
    /// Email already registered.
    Duplicate,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            AuthError::Validation(msg) => write!(f, "{}", msg),
            AuthError::Credential => write!(f, "Invalid credentials or user not found"),
            AuthError::Duplicate => write!(f, "User with this email already exists"),
        }
    }
}

impl std::error::Error for AuthError {}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Info,
    Destructive,
}

/// Short user-facing confirmation or complaint.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub kind: NoticeKind,
}

impl Notice {
    pub fn info(title: &str, description: String) -> Self {
        Self { title: title.to_owned(), description, kind: NoticeKind::Info }
    }

    pub fn destructive(title: &str, description: String) -> Self {
        Self { title: title.to_owned(), description, kind: NoticeKind::Destructive }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    LoggedIn(Identity),
    LoginFailed(AuthError),
    Registered(Identity),
    RegistrationFailed(AuthError),
    LoggedOut,
}

impl Event {
    pub fn notice(&self) -> Notice {
        match self {
            Event::LoggedIn(ident) => Notice::info(
                "Login Successful",
                format!("Welcome back, {}!", &ident.name),
            ),
            Event::LoginFailed(e) => Notice::destructive("Login Failed", e.to_string()),
            Event::Registered(ident) => Notice::info(
                "Registration Successful",
                format!("Welcome to our learning platform, {}!", &ident.name),
            ),
            Event::RegistrationFailed(e) => Notice::destructive(
                "Registration Failed", e.to_string()
            ),
            Event::LoggedOut => Notice::info(
                "Logged Out",
                "You have been successfully logged out.".to_owned(),
            ),
        }
    }

    /// Where the UI should go next, if anywhere.
    pub fn navigate(&self) -> Option<Route> {
        match self {
            Event::LoggedIn(ident) => Some(Route::landing_for(ident.role)),
            Event::Registered(ident) => Some(Route::landing_for(ident.role)),
            Event::LoggedOut => Some(Route::Login),
            Event::LoginFailed(_) | Event::RegistrationFailed(_) => None,
        }
    }
}

fn generate_id() -> String {
    let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ID_SUFFIX_LENGTH)
        .map(char::from)
        .collect();
    format!("user-{}-{}", millis, suffix)
}

pub struct SessionStore<S: Storage> {
    storage: S,
    key: String,
    directory: Directory,
    session: Session,
    events: broadcast::Sender<Event>,
}

impl<S: Storage> SessionStore<S> {
    /// A store with an empty session. Call `restore()` to pick up whatever
    /// was persisted last time.
    pub fn new(storage: S, key: &str, directory: Directory) -> Self {
        log::trace!(
            "SessionStore::new( [ storage ], {:?}, [ {} identities ] ) called.",
            key, directory.len()
        );
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            storage,
            key: key.to_owned(),
            directory,
            session: Session::default(),
            events,
        }
    }

    pub fn session(&self) -> &Session { &self.session }

    pub fn identity(&self) -> Option<&Identity> { self.session.identity() }

    pub fn is_authenticated(&self) -> bool { self.session.is_authenticated() }

    pub fn directory(&self) -> &Directory { &self.directory }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    /// Hand back the storage backend, dropping everything else.
    pub fn into_storage(self) -> S { self.storage }

    fn emit(&self, evt: Event) {
        log::trace!("SessionStore::emit( {:?} ) called.", &evt);
        // No receivers is fine.
        let _ = self.events.send(evt);
    }

    fn persist(&mut self, ident: &Identity) {
        let json = match serde_json::to_string(ident) {
            Ok(json) => json,
            Err(e) => {
                log::error!("Unable to serialize {:?} for storage: {}", ident, &e);
                return;
            },
        };
        if let Err(e) = self.storage.set(&self.key, &json) {
            log::error!("Unable to persist session under {:?}: {}", &self.key, &e);
        }
    }

    /**
    Populate the session from storage, if there's anything usable there.

    Nothing there, a read error, or data that doesn't parse as an `Identity`
    all just leave the session empty. Unparseable data is also removed.
    Returns whether the session is now authenticated.
    */
    pub fn restore(&mut self) -> bool {
        log::trace!("SessionStore::restore() called w/key {:?}.", &self.key);

        let stored = match self.storage.get(&self.key) {
            Ok(Some(s)) => s,
            Ok(None) => { return false; },
            Err(e) => {
                log::error!("Unable to read stored session {:?}: {}", &self.key, &e);
                return false;
            },
        };

        match serde_json::from_str::<Identity>(&stored) {
            Ok(ident) => {
                log::info!("Restored session for {:?} ({}).", &ident.email, &ident.role);
                // A restored registration isn't in a freshly built directory.
                if !self.directory.contains_email(&ident.email) {
                    self.directory.insert(ident.clone());
                }
                self.session = Session::with_identity(ident);
                true
            },
            Err(e) => {
                log::warn!("Discarding malformed stored session {:?}: {}", &self.key, &e);
                if let Err(e) = self.storage.remove(&self.key) {
                    log::error!("Unable to remove malformed session {:?}: {}", &self.key, &e);
                }
                false
            },
        }
    }

    /**
    Log in as the known identity with the given `email` (any case) and
    `role`.

    The `secret` only has to be non-empty. It is never checked against
    anything; see the module documentation.
    */
    pub async fn login(
        &mut self,
        email: &str,
        secret: &str,
        role: Role,
    ) -> Result<Identity, AuthError> {
        log::trace!("SessionStore::login( {:?}, [ secret ], {} ) called.", email, &role);

        if email.is_empty() || secret.is_empty() {
            let e = AuthError::Validation(
                "Please enter both email and password".to_owned()
            );
            self.emit(Event::LoginFailed(e.clone()));
            return Err(e);
        }

        let ident = match self.directory.find(email, role) {
            Some(ident) => ident.clone(),
            None => {
                log::debug!("No {} with email {:?}.", &role, email);
                self.emit(Event::LoginFailed(AuthError::Credential));
                return Err(AuthError::Credential);
            },
        };

        log::warn!(
            "Accepting login for {:?} without credential verification.",
            &ident.email
        );

        self.persist(&ident);
        self.session = Session::with_identity(ident.clone());
        self.emit(Event::LoggedIn(ident.clone()));
        Ok(ident)
    }

    pub async fn register(
        &mut self,
        name: &str,
        email: &str,
        secret: &str,
        role: Role,
    ) -> Result<Identity, AuthError> {
        log::trace!(
            "SessionStore::register( {:?}, {:?}, [ secret ], {} ) called.",
            name, email, &role
        );

        if name.is_empty() || email.is_empty() || secret.is_empty() {
            let e = AuthError::Validation(
                "Please fill in all required fields".to_owned()
            );
            self.emit(Event::RegistrationFailed(e.clone()));
            return Err(e);
        }

        if self.directory.contains_email(email) {
            log::debug!("Email {:?} already registered.", email);
            self.emit(Event::RegistrationFailed(AuthError::Duplicate));
            return Err(AuthError::Duplicate);
        }

        let ident = Identity {
            id: generate_id(),
            name: name.to_owned(),
            email: email.to_owned(),
            role,
            avatar: Some(default_avatar(name)),
        };
        log::info!("Registered {:?} as {} ({}).", &ident.email, &ident.role, &ident.id);

        self.directory.insert(ident.clone());
        self.persist(&ident);
        self.session = Session::with_identity(ident.clone());
        self.emit(Event::Registered(ident.clone()));
        Ok(ident)
    }

    /// Clear the session and its stored copy. Does nothing at all if nobody
    /// is logged in.
    pub async fn logout(&mut self) {
        log::trace!("SessionStore::logout() called.");

        let ident = match self.session.identity.take() {
            Some(ident) => ident,
            None => { return; },
        };

        if let Err(e) = self.storage.remove(&self.key) {
            log::error!("Unable to remove stored session {:?}: {}", &self.key, &e);
        }
        log::info!("Logged out {:?}.", &ident.email);
        self.emit(Event::LoggedOut);
    }
}
