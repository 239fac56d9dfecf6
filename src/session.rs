//! Sign-in state: the persisted `isAuthenticated` flag, the async login
//! contract, and the guard module commands pass through.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{OpsdeskError, Result};

/// Key of the authentication flag.
pub const AUTH_FLAG: &str = "isAuthenticated";

pub const SESSION_FILE: &str = "session.json";

/// Boolean key/value storage for session flags.
pub trait FlagStore {
    fn get(&self, key: &str) -> Result<bool>;

    fn set(&mut self, key: &str, value: bool) -> Result<()>;
}

/// Flags kept in `.opsdesk/session.json`.
#[derive(Debug, Clone)]
pub struct FileFlagStore {
    path: PathBuf,
}

impl FileFlagStore {
    pub fn new(desk_dir: &Path) -> Self {
        Self {
            path: desk_dir.join(SESSION_FILE),
        }
    }

    fn read(&self) -> Result<BTreeMap<String, serde_json::Value>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let text = fs::read_to_string(&self.path)?;
        if text.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&text)?)
    }
}

impl FlagStore for FileFlagStore {
    fn get(&self, key: &str) -> Result<bool> {
        Ok(self
            .read()?
            .get(key)
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false))
    }

    fn set(&mut self, key: &str, value: bool) -> Result<()> {
        let mut flags = self.read()?;
        flags.insert(key.to_string(), serde_json::Value::Bool(value));
        fs::write(&self.path, serde_json::to_string_pretty(&flags)?)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryFlagStore {
    flags: HashMap<String, bool>,
}

impl FlagStore for MemoryFlagStore {
    fn get(&self, key: &str) -> Result<bool> {
        Ok(self.flags.get(key).copied().unwrap_or(false))
    }

    fn set(&mut self, key: &str, value: bool) -> Result<()> {
        self.flags.insert(key.to_string(), value);
        Ok(())
    }
}

#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// `Idle -> Pending -> Authenticated | Failed`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginState {
    Idle,
    Pending,
    Authenticated,
    Failed(String),
}

/// Something that can check credentials.
#[allow(async_fn_in_trait)]
pub trait AuthTransport {
    async fn authenticate(&self, credentials: &Credentials) -> Result<()>;
}

/// Accepts any well-formed email with a non-empty password after a fixed delay.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedTransport {
    latency: Duration,
}

impl SimulatedTransport {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

impl AuthTransport for SimulatedTransport {
    async fn authenticate(&self, credentials: &Credentials) -> Result<()> {
        tokio::time::sleep(self.latency).await;

        if !credentials.email.contains('@') {
            return Err(OpsdeskError::AuthFailed(
                "email must contain '@'".to_string(),
            ));
        }
        if credentials.password.is_empty() {
            return Err(OpsdeskError::AuthFailed(
                "password cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

pub struct Session<F: FlagStore> {
    flags: F,
    state: LoginState,
}

impl<F: FlagStore> Session<F> {
    pub fn new(flags: F) -> Result<Self> {
        let state = if flags.get(AUTH_FLAG)? {
            LoginState::Authenticated
        } else {
            LoginState::Idle
        };
        Ok(Self { flags, state })
    }

    pub fn state(&self) -> &LoginState {
        &self.state
    }

    pub fn is_authenticated(&self) -> Result<bool> {
        self.flags.get(AUTH_FLAG)
    }

    pub async fn login<T: AuthTransport>(
        &mut self,
        transport: &T,
        credentials: &Credentials,
    ) -> Result<()> {
        self.state = LoginState::Pending;
        tracing::debug!(email = %credentials.email, "login requested");

        match transport.authenticate(credentials).await {
            Ok(()) => {
                self.flags.set(AUTH_FLAG, true)?;
                self.state = LoginState::Authenticated;
                tracing::info!(email = %credentials.email, "signed in");
                Ok(())
            }
            Err(e) => {
                self.flags.set(AUTH_FLAG, false)?;
                self.state = LoginState::Failed(e.to_string());
                tracing::warn!(email = %credentials.email, error = %e, "sign-in failed");
                Err(e)
            }
        }
    }

    pub fn logout(&mut self) -> Result<()> {
        self.flags.set(AUTH_FLAG, false)?;
        self.state = LoginState::Idle;
        tracing::info!("signed out");
        Ok(())
    }
}

/// Gate in front of module commands.
#[derive(Debug, Clone, Copy)]
pub struct NavigationGuard {
    require_login: bool,
}

impl NavigationGuard {
    pub fn new(require_login: bool) -> Self {
        Self { require_login }
    }

    pub fn check<F: FlagStore>(&self, flags: &F) -> Result<()> {
        if self.require_login && !flags.get(AUTH_FLAG)? {
            return Err(OpsdeskError::NotAuthenticated);
        }
        Ok(())
    }
}
