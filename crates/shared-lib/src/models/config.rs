use color_eyre::eyre::{bail, Context};
use color_eyre::{Help, Result};
use std::sync::Arc;

/// 存储后端类型
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// PostgreSQL，项目与其下的issue以JSONB文档形式存放
    Postgres,

    /// 进程内存储，进程退出后数据丢失，适合本地调试
    Memory,
}

/// 数据库连接池配置
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// postgresql数据库链接字符串
    pub postgresql_conn_str: String,

    /// 连接池最大连接数
    ///
    /// 可通过环境变量 `DB_MAX_CONNECTIONS` 来调整
    pub max_connections: u32,

    /// 连接池启动时预留的连接数
    ///
    /// 可通过环境变量 `DB_MIN_CONNECTIONS` 来调整
    pub min_connections: u32,
}

/// 程序配置
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// 存储后端
    pub storage: StorageBackend,

    /// 数据库配置，仅在 [`StorageBackend::Postgres`] 时存在
    pub database: Option<DatabaseConfig>,

    /// Web服务监听地址
    pub bind_addr: String,
}

impl AppConfig {
    pub fn load() -> Result<Arc<AppConfig>> {
        // 加载.env文件中的数据注入到环境变量中，方便本地测试
        // 线上环境部署时会直接使用环境变量，不需要.env文件
        dotenvy::dotenv().ok();

        let storage = match std::env::var("STORAGE_BACKEND") {
            Err(_) => StorageBackend::Postgres,
            Ok(s) => parse_storage_backend(&s)?,
        };

        let database = match storage {
            StorageBackend::Memory => None,
            StorageBackend::Postgres => {
                // 读取数据库地址信息（仅支持postgresql）
                let db_url = std::env::var("DATABASE_URL")
                    .context("Can not load DATABASE_URL in environment")
                    .suggestion("设置 DATABASE_URL 环境变量，或设置 STORAGE_BACKEND=memory")?;

                Some(DatabaseConfig {
                    postgresql_conn_str: db_url,
                    max_connections: std::env::var("DB_MAX_CONNECTIONS")
                        .map_or(40, |s| s.parse().unwrap_or(40)),
                    min_connections: std::env::var("DB_MIN_CONNECTIONS")
                        .map_or(10, |s| s.parse().unwrap_or(10)),
                })
            }
        };

        let config = AppConfig {
            storage,
            database,
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
        };
        Ok(Arc::new(config))
    }
}

fn parse_storage_backend(value: &str) -> Result<StorageBackend> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
        "memory" => Ok(StorageBackend::Memory),
        other => bail!("Unknown STORAGE_BACKEND `{other}`, expected `postgres` or `memory`"),
    }
}
