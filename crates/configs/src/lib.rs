use std::collections::HashMap;

use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;
use common::pagination::MAX_PAGE_SIZE;

/// 未配置任何数据库地址时使用的本地 SQLite 文件
pub const DEFAULT_DATABASE_URL: &str = "sqlite://services.db?mode=rwc";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
    /// 调用方超时（秒）；为空表示不限制
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080, worker_threads: Some(4), request_timeout_secs: None }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
    #[serde(default = "default_true")]
    pub run_migrations: bool,
    #[serde(default)]
    pub seed_demo_data: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            max_lifetime_secs: default_max_lifetime(),
            acquire_timeout_secs: default_acquire_timeout(),
            sqlx_logging: false,
            run_migrations: true,
            seed_demo_data: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaginationConfig {
    #[serde(default = "default_page_size")]
    pub default_page_size: u64,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self { default_page_size: default_page_size(), max_page_size: default_max_page_size() }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AuthConfig {
    /// HS256 密钥；为空时从环境变量 JWT_SECRET 读取
    #[serde(default)]
    pub jwt_secret: String,
    /// 静态令牌表：token -> 主体与角色
    #[serde(default)]
    pub static_tokens: HashMap<String, StaticTokenConfig>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct StaticTokenConfig {
    pub subject: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 1 }
fn default_connect_timeout() -> u64 { 30 }
fn default_idle_timeout() -> u64 { 600 }
fn default_max_lifetime() -> u64 { 3600 }
fn default_acquire_timeout() -> u64 { 30 }
fn default_true() -> bool { true }
fn default_page_size() -> u64 { 12 }
fn default_max_page_size() -> u64 { 100 }

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// SERVER_PORT 优先，兼容旧部署使用的 PORT
fn port_from(env: impl Fn(&str) -> Option<String>) -> Option<u16> {
    ["SERVER_PORT", "PORT"]
        .iter()
        .find_map(|key| env(key).and_then(|p| p.trim().parse::<u16>().ok()))
}

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// 配置文件缺失时，基于环境变量与默认值构建配置
    pub fn from_env() -> Result<Self> {
        let mut cfg = AppConfig::default();
        if let Ok(host) = std::env::var("SERVER_HOST") {
            cfg.server.host = host;
        }
        if let Some(port) = port_from(env_var) {
            cfg.server.port = port;
        }
        cfg.server.worker_threads = std::env::var("TOKIO_WORKER_THREADS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok());
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        // 归一化 server
        self.server.normalize()?;
        // 归一化 database（支持从环境变量填充 URL）
        self.database.normalize_from_env();
        self.database.validate()?;
        self.pagination.validate()?;
        self.auth.normalize_from_env();
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port 必须在 1..=65535 范围内"));
        }
        match self.worker_threads {
            Some(w) if w > 0 => {}
            _ => self.worker_threads = Some(4),
        }
        if self.request_timeout_secs == Some(0) {
            self.request_timeout_secs = None;
        }
        Ok(())
    }
}

impl DatabaseConfig {
    pub fn normalize_from_env(&mut self) {
        self.normalize_with(env_var);
    }

    /// 若 TOML 中未提供 URL：DATABASE_URL，其次 DB_PATH（SQLite 文件路径），最后回退到本地 SQLite
    fn normalize_with(&mut self, env: impl Fn(&str) -> Option<String>) {
        if !self.url.trim().is_empty() {
            return;
        }
        self.url = env("DATABASE_URL")
            .filter(|u| !u.trim().is_empty())
            .or_else(|| env("DB_PATH").filter(|p| !p.trim().is_empty()).map(|p| format!("sqlite://{}?mode=rwc", p.trim())))
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
    }

    pub fn is_sqlite(&self) -> bool {
        self.url.to_lowercase().starts_with("sqlite:")
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!("database.url 为空；请在 config.toml 或环境变量 DATABASE_URL 中提供"));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("postgresql://") || lower.starts_with("postgres://") || lower.starts_with("sqlite:")) {
            return Err(anyhow!("database.url 必须以 postgresql://、postgres:// 或 sqlite: 开头"));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("database.min_connections 必须 >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections 必须 >= min_connections"));
        }
        if self.connect_timeout_secs == 0 || self.acquire_timeout_secs == 0 {
            return Err(anyhow!("database 超时配置必须为正整数秒"));
        }
        Ok(())
    }
}

impl PaginationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.default_page_size == 0 || self.max_page_size == 0 {
            return Err(anyhow!("pagination 页大小必须 >= 1"));
        }
        if self.max_page_size > MAX_PAGE_SIZE {
            return Err(anyhow!("pagination.max_page_size 不能超过 {}", MAX_PAGE_SIZE));
        }
        if self.default_page_size > self.max_page_size {
            return Err(anyhow!("pagination.default_page_size 不能大于 max_page_size"));
        }
        Ok(())
    }
}

impl AuthConfig {
    pub fn normalize_from_env(&mut self) {
        if self.jwt_secret.trim().is_empty() {
            if let Ok(secret) = std::env::var("JWT_SECRET") {
                self.jwt_secret = secret;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_document() {
        let cfg = parse(
            r#"
            [server]
            host = "0.0.0.0"
            port = 9000
            request_timeout_secs = 5

            [database]
            url = "postgres://u:p@localhost/catalog"
            seed_demo_data = true

            [pagination]
            default_page_size = 20

            [auth]
            jwt_secret = "s3cret"

            [auth.static_tokens.admin-token]
            subject = "admin"
            roles = ["admin"]
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.server.request_timeout_secs, Some(5));
        assert!(cfg.database.seed_demo_data);
        assert!(cfg.database.run_migrations);
        assert_eq!(cfg.pagination.default_page_size, 20);
        assert_eq!(cfg.pagination.max_page_size, 100);
        let admin = &cfg.auth.static_tokens["admin-token"];
        assert_eq!(admin.subject, "admin");
        assert_eq!(admin.roles, vec!["admin".to_string()]);
    }

    #[test]
    fn empty_document_uses_defaults() {
        let cfg = parse("").unwrap();
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.pagination.default_page_size, 12);
        assert!(cfg.auth.static_tokens.is_empty());
    }

    #[test]
    fn rejects_unknown_database_scheme() {
        let mut db = DatabaseConfig::default();
        db.url = "mysql://localhost/db".into();
        assert!(db.validate().is_err());
        db.url = "sqlite::memory:".into();
        assert!(db.validate().is_ok());
        assert!(db.is_sqlite());
    }

    #[test]
    fn rejects_inverted_pool_bounds() {
        let mut db = DatabaseConfig::default();
        db.url = "postgres://localhost/db".into();
        db.min_connections = 5;
        db.max_connections = 2;
        assert!(db.validate().is_err());
    }

    #[test]
    fn rejects_default_page_size_above_max() {
        let p = PaginationConfig { default_page_size: 200, max_page_size: 100 };
        assert!(p.validate().is_err());
        let zero = PaginationConfig { default_page_size: 0, max_page_size: 100 };
        assert!(zero.validate().is_err());
    }

    #[test]
    fn server_normalize_fills_blanks() {
        let mut s = ServerConfig { host: " ".into(), port: 8080, worker_threads: Some(0), request_timeout_secs: Some(0) };
        s.normalize().unwrap();
        assert_eq!(s.host, "127.0.0.1");
        assert_eq!(s.worker_threads, Some(4));
        assert_eq!(s.request_timeout_secs, None);
    }

    #[test]
    fn example_file_is_valid() {
        let mut cfg = parse(include_str!("../../../config.example.toml")).unwrap();
        cfg.normalize_and_validate().unwrap();
        assert!(cfg.database.seed_demo_data);
        assert_eq!(cfg.auth.static_tokens["viewer-token"].roles, vec!["viewer".to_string()]);
    }

    #[test]
    fn rejects_max_page_size_above_hard_cap() {
        let mut cfg = parse(
            r#"
            [database]
            url = "sqlite::memory:"

            [pagination]
            max_page_size = 500
            "#,
        )
        .unwrap();
        assert!(cfg.normalize_and_validate().is_err());

        cfg.pagination.max_page_size = 100;
        assert!(cfg.normalize_and_validate().is_ok());
    }

    fn fake_env(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |key| pairs.iter().find(|(k, _)| *k == key).map(|(_, v)| v.to_string())
    }

    #[test]
    fn port_falls_back_to_legacy_variable() {
        assert_eq!(port_from(fake_env(&[("PORT", "9090")])), Some(9090));
        assert_eq!(port_from(fake_env(&[("SERVER_PORT", "8081"), ("PORT", "9090")])), Some(8081));
        assert_eq!(port_from(fake_env(&[("SERVER_PORT", "x"), ("PORT", "9090")])), Some(9090));
        assert_eq!(port_from(fake_env(&[])), None);
    }

    #[test]
    fn db_path_becomes_sqlite_url() {
        let mut db = DatabaseConfig::default();
        db.normalize_with(fake_env(&[("DB_PATH", "/var/lib/catalog/services.db")]));
        assert_eq!(db.url, "sqlite:///var/lib/catalog/services.db?mode=rwc");
        assert!(db.is_sqlite());

        let mut db = DatabaseConfig::default();
        db.normalize_with(fake_env(&[("DATABASE_URL", "postgres://u:p@h/db"), ("DB_PATH", "x.db")]));
        assert_eq!(db.url, "postgres://u:p@h/db");

        let mut db = DatabaseConfig::default();
        db.normalize_with(fake_env(&[]));
        assert_eq!(db.url, DEFAULT_DATABASE_URL);

        let mut db = DatabaseConfig { url: "sqlite::memory:".into(), ..Default::default() };
        db.normalize_with(fake_env(&[("DB_PATH", "ignored.db")]));
        assert_eq!(db.url, "sqlite::memory:");
    }
}
