use crate::auth::JwtConfig;
use crate::catalog::BatchPolicy;
use crate::core::error::{Result, ServerError};

/// 数据库连接配置
#[derive(Clone)]
pub struct DatabaseConfig {
    /// `memory` | `mem://` | `rocksdb://<path>` | `ws://host:port`
    pub url: String,
    pub namespace: String,
    pub database: String,
    /// Root 用户 (远程引擎)
    pub username: Option<String>,
    pub password: Option<String>,
}

impl DatabaseConfig {
    /// 进程内存储 (非 SurrealDB)
    pub fn memory() -> Self {
        Self {
            url: "memory".to_string(),
            ..Self::default()
        }
    }

    pub fn is_memory(&self) -> bool {
        self.url.eq_ignore_ascii_case("memory")
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "rocksdb://./data/catalog.db".to_string(),
            namespace: "catalog".to_string(),
            database: "catalog".to_string(),
            username: None,
            password: None,
        }
    }
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &self.url)
            .field("namespace", &self.namespace)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// 服务器配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖 (`.env` 由 dotenvy 预先加载)：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | DATABASE_URL | rocksdb://./data/catalog.db | 存储引擎 |
/// | DATABASE_NAMESPACE | catalog | SurrealDB namespace |
/// | DATABASE_NAME | catalog | SurrealDB database |
/// | DATABASE_USER / DATABASE_PASSWORD | - | 远程引擎 root 登录 |
/// | HTTP_PORT (或 PORT) | 3000 | HTTP 服务端口 |
/// | JWT_SECRET | 开发环境自动生成 | 生产环境必填，至少 32 字符 |
/// | JWT_EXPIRATION_MINUTES | 1440 | 令牌有效期 |
/// | JWT_ISSUER / JWT_AUDIENCE | catalog-server / catalog-clients | |
/// | ALLOWED_ORIGINS | - | 逗号分隔；为空时 CORS 放行所有来源 |
/// | BATCH_POLICY | skip_invalid | skip_invalid \| reject_all |
/// | ENVIRONMENT | development | development \| staging \| production |
/// | LOG_LEVEL | info | 日志级别 (RUST_LOG 优先) |
/// | LOG_DIR | - | 设置后按天滚动写入文件 |
/// | LOG_FORMAT | text | text \| json |
///
/// # 示例
///
/// ```ignore
/// DATABASE_URL=mem:// HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 数据库配置
    pub database: DatabaseConfig,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    /// CORS 允许的来源，空表示不限制
    pub allowed_origins: Vec<String>,
    /// 批量对账策略
    pub batch_policy: BatchPolicy,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 日志级别 (RUST_LOG 优先)
    pub log_level: String,
    /// 设置后按天滚动写入文件
    pub log_dir: Option<String>,
    /// JSON 格式输出
    pub log_json: bool,
}

impl Config {
    /// 开发默认值，不读取环境变量 (常用于测试)
    pub fn development() -> Self {
        Self {
            http_port: 3000,
            database: DatabaseConfig::default(),
            jwt: JwtConfig::development(),
            allowed_origins: Vec::new(),
            batch_policy: BatchPolicy::default(),
            environment: "development".to_string(),
            log_level: "info".to_string(),
            log_dir: None,
            log_json: false,
        }
    }

    /// 从环境变量加载配置
    ///
    /// 未设置的项使用默认值；取值非法时返回 [`ServerError::Config`]。
    pub fn from_env() -> Result<Self> {
        let environment = env_or("ENVIRONMENT", "development");
        let production = environment == "production";

        let http_port = match std::env::var("HTTP_PORT").or_else(|_| std::env::var("PORT")) {
            Ok(p) => p
                .parse()
                .map_err(|_| ServerError::Config(format!("Invalid HTTP_PORT: {p}")))?,
            Err(_) => 3000,
        };

        let defaults = DatabaseConfig::default();
        let database = DatabaseConfig {
            url: env_or("DATABASE_URL", &defaults.url),
            namespace: env_or("DATABASE_NAMESPACE", &defaults.namespace),
            database: env_or("DATABASE_NAME", &defaults.database),
            username: std::env::var("DATABASE_USER").ok(),
            password: std::env::var("DATABASE_PASSWORD").ok(),
        };

        let jwt = JwtConfig::from_env(production).map_err(|e| ServerError::Config(e.to_string()))?;

        let allowed_origins = std::env::var("ALLOWED_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let batch_policy = match std::env::var("BATCH_POLICY") {
            Ok(v) => v.parse::<BatchPolicy>().map_err(ServerError::Config)?,
            Err(_) => BatchPolicy::default(),
        };

        Ok(Self {
            http_port,
            database,
            jwt,
            allowed_origins,
            batch_policy,
            environment,
            log_level: env_or("LOG_LEVEL", "info"),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.trim().is_empty()),
            log_json: std::env::var("LOG_FORMAT")
                .map(|f| f.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
