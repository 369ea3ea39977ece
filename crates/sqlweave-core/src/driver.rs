//! The driver boundary.
//!
//! The core executes SQL through exactly one primitive,
//! [`Connection::execute`]; it never opens sockets itself. Concrete
//! drivers live outside this workspace and plug in through these
//! traits.

use std::fmt;

use crate::error::Result;
use crate::value::{RawRow, Value};

/// Connection parameters handed to [`Driver::connect`].
#[derive(Clone)]
pub struct ConnectConfig {
    pub location: String,
    pub user: String,
    pub password: String,
    pub name: String,
}

impl ConnectConfig {
    pub fn new(
        location: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        ConnectConfig {
            location: location.into(),
            user: user.into(),
            password: password.into(),
            name: name.into(),
        }
    }
}

// Passwords never reach logs.
impl fmt::Debug for ConnectConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectConfig")
            .field("location", &self.location)
            .field("user", &self.user)
            .field("password", &"*****")
            .field("name", &self.name)
            .finish()
    }
}

impl fmt::Display for ConnectConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}/{}", self.user, self.location, self.name)
    }
}

/// Factory for live connections.
pub trait Driver {
    type Conn: Connection;

    fn connect(&self, config: &ConnectConfig) -> Result<Self::Conn>;
}

/// A live, blocking database connection.
pub trait Connection {
    /// Execute one statement. Row-returning statements yield
    /// `Some(rows)` (possibly empty); others yield `None`.
    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<Option<Vec<RawRow>>>;

    fn commit(&mut self) -> Result<()>;

    fn rollback(&mut self) -> Result<()>;

    fn close(&mut self) -> Result<()>;
}
