use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
    #[serde(default)]
    pub tasks: TaskConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 为空时允许任意来源
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// 托管身份提供方签发的 bearer token 校验参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub token_secret: String,
    #[serde(default)]
    pub issuer: Option<String>,
    #[serde(default)]
    pub audience: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NotificationConfig {
    /// 合作伙伴咨询的收件人，缺失时该接口直接报错
    #[serde(default)]
    pub partnership_recipient: Option<String>,
    #[serde(default)]
    pub sender: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskConfig {
    /// 活动统计对账间隔（秒），0 表示关闭
    pub reconcile_interval_secs: u64,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            reconcile_interval_secs: 3600,
        }
    }
}

fn get_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    get_env(name)
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl Config {
    /// 读取 `CONFIG_PATH`（默认 config.toml），文件不存在时完全依赖环境变量；
    /// 环境变量总是覆盖文件中的值
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        let mut config = match std::fs::read_to_string(&config_path) {
            Ok(config_str) => Self::from_toml_str(&config_str)?,
            Err(e) if e.kind() == ErrorKind::NotFound => Self::from_env()?,
            Err(e) => {
                return Err(format!("Failed to read config file {config_path}: {e}").into());
            }
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, Box<dyn std::error::Error>> {
        toml::from_str(raw).map_err(|e| format!("Failed to parse config file: {e}").into())
    }

    fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        // 没有配置文件时数据库地址必须通过环境变量提供
        let database_url = get_env("DATABASE_URL")
            .ok_or("DATABASE_URL is not set and no config.toml was found")?;

        Ok(Config {
            server: ServerConfig {
                host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: get_env_parse("SERVER_PORT", 8080u16),
                allowed_origins: get_env("ALLOWED_ORIGINS")
                    .map(|v| split_list(&v))
                    .unwrap_or_default(),
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
            },
            auth: AuthConfig {
                token_secret: get_env("AUTH_TOKEN_SECRET").unwrap_or_default(),
                issuer: get_env("AUTH_ISSUER"),
                audience: get_env("AUTH_AUDIENCE"),
            },
            notifications: NotificationConfig {
                partnership_recipient: get_env("NOTIFICATION_RECIPIENT"),
                sender: get_env("NOTIFICATION_SENDER"),
            },
            tasks: TaskConfig {
                reconcile_interval_secs: get_env_parse("RECONCILE_INTERVAL_SECS", 3600u64),
            },
        })
    }

    fn apply_env_overrides(&mut self) {
        if let Some(v) = get_env("SERVER_HOST") {
            self.server.host = v;
        }
        if let Some(v) = get_env("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            self.server.port = p;
        }
        if let Some(v) = get_env("ALLOWED_ORIGINS") {
            self.server.allowed_origins = split_list(&v);
        }
        if let Some(v) = get_env("DATABASE_URL") {
            self.database.url = v;
        }
        if let Some(v) = get_env("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            self.database.max_connections = mc;
        }
        if let Some(v) = get_env("AUTH_TOKEN_SECRET") {
            self.auth.token_secret = v;
        }
        if let Some(v) = get_env("AUTH_ISSUER") {
            self.auth.issuer = Some(v);
        }
        if let Some(v) = get_env("AUTH_AUDIENCE") {
            self.auth.audience = Some(v);
        }
        if let Some(v) = get_env("NOTIFICATION_RECIPIENT") {
            self.notifications.partnership_recipient = Some(v);
        }
        if let Some(v) = get_env("NOTIFICATION_SENDER") {
            self.notifications.sender = Some(v);
        }
        if let Some(v) = get_env("RECONCILE_INTERVAL_SECS")
            && let Ok(n) = v.parse()
        {
            self.tasks.reconcile_interval_secs = n;
        }
    }

    fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        if self.database.url.trim().is_empty() {
            return Err("database.url must not be empty".into());
        }
        if self.auth.token_secret.trim().is_empty() {
            return Err("auth.token_secret (AUTH_TOKEN_SECRET) must be set".into());
        }
        if self.database.max_connections == 0 {
            return Err("database.max_connections must be at least 1".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[server]
host = "127.0.0.1"
port = 9000

[database]
url = "postgres://localhost/charity"
max_connections = 5

[auth]
token_secret = "secret"
issuer = "https://auth.example.org"

[notifications]
partnership_recipient = "partners@example.org"
"#;

    #[test]
    fn test_parse_toml() {
        let config = Config::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.server.port, 9000);
        assert!(config.server.allowed_origins.is_empty());
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.auth.issuer.as_deref(), Some("https://auth.example.org"));
        assert_eq!(
            config.notifications.partnership_recipient.as_deref(),
            Some("partners@example.org")
        );
        assert_eq!(config.tasks.reconcile_interval_secs, 3600);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_secret() {
        let mut config = Config::from_toml_str(SAMPLE).unwrap();
        config.auth.token_secret = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_split_list() {
        assert_eq!(
            split_list("https://a.org, https://b.org,,"),
            vec!["https://a.org".to_string(), "https://b.org".to_string()]
        );
    }
}
