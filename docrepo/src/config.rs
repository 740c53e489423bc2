//! Connection string parsing.
//!
//! Accepted form:
//!
//! ```text
//! scheme://[user[:password]@]host[:port][,host[:port]...][/database][?option=value&...]
//! ```
//!
//! Recognized options (names are case-insensitive): `tls` / `ssl`,
//! `tlsVersion` (`1.2` or `1.3`), `tlsAllowInvalidCertificates`, `appName`,
//! `connectTimeoutMS`. Other options are kept verbatim and handed to the
//! driver. Schemes ending in `+srv` imply TLS. When TLS is on and no version
//! is given, TLS 1.3 is selected.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::time::Duration;

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::common::MEMORY_SCHEME;
use crate::errors::{ErrorKind, RepoError, RepoResult};

static CONNECTION_STRING: Lazy<Result<Regex, regex::Error>> = Lazy::new(|| {
    Regex::new(
        r"^(?P<scheme>[A-Za-z][A-Za-z0-9+.\-]*)://(?:(?P<user>[^:@/]*)(?::(?P<password>[^@/]*))?@)?(?P<hosts>[^/?]*)(?:/(?P<database>[^?]*))?(?:\?(?P<options>.*))?$",
    )
});

const INVALID_DATABASE_CHARS: &[char] = &['/', '\\', '.', ' ', '"', '$'];

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum TlsVersion {
    Tls12,
    Tls13,
}

impl Display for TlsVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TlsVersion::Tls12 => write!(f, "1.2"),
            TlsVersion::Tls13 => write!(f, "1.3"),
        }
    }
}

/// Transport security requested by a connection string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TlsSettings {
    pub enabled: bool,
    pub min_version: TlsVersion,
    pub allow_invalid_certificates: bool,
}

impl Default for TlsSettings {
    fn default() -> Self {
        TlsSettings {
            enabled: false,
            min_version: TlsVersion::Tls13,
            allow_invalid_certificates: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostAddress {
    pub host: String,
    pub port: Option<u16>,
}

impl Display for HostAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.port {
            Some(port) => write!(f, "{}:{}", self.host, port),
            None => write!(f, "{}", self.host),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "****"))
            .finish()
    }
}

/// A parsed connection string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectionConfig {
    scheme: String,
    credentials: Option<Credentials>,
    hosts: Vec<HostAddress>,
    database: String,
    tls: TlsSettings,
    app_name: Option<String>,
    connect_timeout: Option<Duration>,
    options: BTreeMap<String, String>,
}

impl ConnectionConfig {
    /// Parses a connection string.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if the string is blank, does not match
    /// the grammar, names no host (except for `memory://`), names no
    /// database, or carries a malformed option value.
    pub fn parse(connection_string: &str) -> RepoResult<ConnectionConfig> {
        let text = connection_string.trim();
        if text.is_empty() {
            return Err(invalid("Connection string must not be empty".to_string()));
        }

        let grammar = (*CONNECTION_STRING).as_ref().map_err(|err| {
            log::error!("Connection string grammar failed to compile: {}", err);
            RepoError::new(&err.to_string(), ErrorKind::InternalError)
        })?;

        let captures = grammar
            .captures(text)
            .ok_or_else(|| invalid(format!("Malformed connection string {}", mask(text))))?;

        let scheme = captures["scheme"].to_ascii_lowercase();
        let credentials = match captures.name("user") {
            Some(user) => Some(Credentials {
                username: decode(user.as_str())?,
                password: captures
                    .name("password")
                    .map(|p| decode(p.as_str()))
                    .transpose()?,
            }),
            None => None,
        };

        let hosts = parse_hosts(&scheme, captures.name("hosts").map_or("", |m| m.as_str()))?;

        let database = match captures.name("database") {
            Some(db) => decode(db.as_str())?,
            None => String::new(),
        };
        validate_database(&database)?;

        let mut config = ConnectionConfig {
            tls: TlsSettings {
                enabled: scheme.ends_with("+srv"),
                ..TlsSettings::default()
            },
            scheme,
            credentials,
            hosts,
            database,
            app_name: None,
            connect_timeout: None,
            options: BTreeMap::new(),
        };

        if let Some(options) = captures.name("options") {
            config.apply_options(options.as_str())?;
        }
        Ok(config)
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn hosts(&self) -> &[HostAddress] {
        &self.hosts
    }

    /// Hosts joined by `,` as they appear in a connection string.
    pub fn host_list(&self) -> String {
        self.hosts.iter().join(",")
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn tls(&self) -> &TlsSettings {
        &self.tls
    }

    pub fn app_name(&self) -> Option<&str> {
        self.app_name.as_deref()
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout
    }

    /// An unrecognized option, by its lower-cased name.
    pub fn option(&self, name: &str) -> Option<&str> {
        self.options.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    fn apply_options(&mut self, options: &str) -> RepoResult<()> {
        let mut explicit_version = false;
        for pair in options.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let key = decode(key)?.to_ascii_lowercase();
            let value = decode(value)?;

            match key.as_str() {
                "tls" | "ssl" => self.tls.enabled = parse_bool(&key, &value)?,
                "tlsversion" => {
                    self.tls.min_version = match value.as_str() {
                        "1.2" => TlsVersion::Tls12,
                        "1.3" => TlsVersion::Tls13,
                        other => return Err(invalid(format!("Unsupported TLS version {}", other))),
                    };
                    explicit_version = true;
                }
                "tlsallowinvalidcertificates" => {
                    self.tls.allow_invalid_certificates = parse_bool(&key, &value)?
                }
                "appname" => self.app_name = Some(value),
                "connecttimeoutms" => {
                    let millis = value
                        .parse::<u64>()
                        .map_err(|_| invalid(format!("Invalid value {} for connectTimeoutMS", value)))?;
                    self.connect_timeout = Some(Duration::from_millis(millis));
                }
                _ => {
                    log::debug!("Keeping unrecognized connection option {}={}", key, value);
                    self.options.insert(key, value);
                }
            }
        }

        if explicit_version && !self.tls.enabled {
            log::warn!("tlsVersion given without tls=true; TLS stays disabled");
        }
        Ok(())
    }
}

impl FromStr for ConnectionConfig {
    type Err = RepoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConnectionConfig::parse(s)
    }
}

impl Display for ConnectionConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}://", self.scheme)?;
        if let Some(credentials) = &self.credentials {
            write!(f, "{}", credentials.username)?;
            if credentials.password.is_some() {
                write!(f, ":****")?;
            }
            write!(f, "@")?;
        }
        write!(f, "{}/{}", self.host_list(), self.database)?;

        let mut options = Vec::new();
        if self.tls.enabled {
            options.push(format!("tls=true&tlsVersion={}", self.tls.min_version));
        }
        if let Some(app_name) = &self.app_name {
            options.push(format!("appName={}", app_name));
        }
        options.extend(self.options.iter().map(|(k, v)| format!("{}={}", k, v)));
        if !options.is_empty() {
            write!(f, "?{}", options.join("&"))?;
        }
        Ok(())
    }
}

fn invalid(message: String) -> RepoError {
    log::error!("{}", message);
    RepoError::new(&message, ErrorKind::InvalidConfiguration)
}

fn decode(text: &str) -> RepoResult<String> {
    urlencoding::decode(text)
        .map(|decoded| decoded.into_owned())
        .map_err(|_| invalid("Connection string contains invalid percent-encoding".to_string()))
}

fn parse_bool(key: &str, value: &str) -> RepoResult<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(invalid(format!("Invalid boolean {} for option {}", value, key))),
    }
}

fn parse_hosts(scheme: &str, hosts: &str) -> RepoResult<Vec<HostAddress>> {
    if hosts.is_empty() {
        if scheme == MEMORY_SCHEME {
            return Ok(vec![HostAddress {
                host: "local".to_string(),
                port: None,
            }]);
        }
        return Err(invalid("Connection string names no host".to_string()));
    }

    hosts
        .split(',')
        .map(|entry| {
            let (host, port) = match entry.rsplit_once(':') {
                Some((host, port)) => {
                    let port = port
                        .parse::<u16>()
                        .map_err(|_| invalid(format!("Invalid port in host {}", entry)))?;
                    (host, Some(port))
                }
                None => (entry, None),
            };
            if host.trim().is_empty() {
                return Err(invalid(format!("Empty host in {}", hosts)));
            }
            Ok(HostAddress {
                host: host.to_string(),
                port,
            })
        })
        .collect()
}

fn validate_database(database: &str) -> RepoResult<()> {
    if database.is_empty() {
        return Err(invalid("Connection string names no database".to_string()));
    }
    if database.contains(INVALID_DATABASE_CHARS) {
        return Err(invalid(format!("Invalid database name {}", database)));
    }
    Ok(())
}

fn mask(text: &str) -> String {
    match (text.find("://"), text.find('@')) {
        (Some(start), Some(at)) if at > start => {
            let user_info = &text[start + 3..at];
            match user_info.split_once(':') {
                Some((user, _)) => format!("{}{}:****{}", &text[..start + 3], user, &text[at..]),
                None => text.to_string(),
            }
        }
        _ => text.to_string(),
    }
}
