use tiberius::{AuthMethod, Config, EncryptionLevel};

pub const DEFAULT_PORT: u16 = 1433;

/// Everything needed to open one SQL Server session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MssqlConnectOptions {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: Option<String>,
    pub encrypt: bool,
    pub trust_cert: bool,
}

impl MssqlConnectOptions {
    pub fn new(host: impl Into<String>, user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            user: user.into(),
            password: password.into(),
            database: None,
            encrypt: false,
            trust_cert: false,
        }
    }

    pub fn to_config(&self) -> Config {
        let mut config = Config::new();
        config.host(&self.host);
        config.port(self.port);
        config.authentication(AuthMethod::sql_server(&self.user, &self.password));
        if let Some(db) = self.database.as_deref().filter(|db| !db.is_empty()) {
            config.database(db);
        }
        config.encryption(if self.encrypt {
            EncryptionLevel::Required
        } else {
            EncryptionLevel::NotSupported
        });
        if self.trust_cert {
            config.trust_cert();
        }
        config
    }

    /// `host:port`, for logs and errors.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_address() {
        let mut options = MssqlConnectOptions::new("db.internal", "sa", "secret");
        options.port = 14330;
        assert_eq!(options.addr(), "db.internal:14330");
        assert_eq!(options.to_config().get_addr(), "db.internal:14330");
    }
}
