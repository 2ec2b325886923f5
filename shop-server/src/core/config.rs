use chrono_tz::Tz;
use std::str::FromStr;
use std::time::Duration;

use crate::utils::parse_timezone;

/// 快照缓存命名空间配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheNamespace {
    /// 缓存键前缀
    pub prefix: String,
    /// 快照 TTL
    pub ttl: Duration,
}

/// 服务器配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖（启动时先加载 `.env`），无效值回退到默认值并记录 warn：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | HTTP_PORT | 8000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | LOG_LEVEL | info | 日志级别 (`RUST_LOG` 优先) |
/// | LOG_JSON | false | JSON 控制台日志 |
/// | LOG_DIR | - | 滚动日志目录 |
/// | PAGE_SIZE | 10 | 默认页大小 / 默认 limit |
/// | MAX_PAGE_SIZE | 100 | 页大小上限 |
/// | PAGINATION_ORPHANS | 0 | 末页孤儿容忍量 |
/// | FAST_PAGE_PAGINATION_TIMEOUT | 3600 | 页码快照 TTL (秒) |
/// | FAST_PAGE_PAGINATION_PREFIX | api_fast_page_pagination | 页码缓存键前缀 |
/// | FAST_LIMIT_OFFSET_PAGINATION_TIMEOUT | 3600 | 偏移快照 TTL (秒) |
/// | FAST_LIMIT_OFFSET_PAGINATION_PREFIX | api_fast_limit_offset_pagination | 偏移缓存键前缀 |
/// | USE_ASYNC_TASK_COLLECTOR | false | 启用后台清扫 |
/// | TASK_COLLECTOR_REFRESH_RATE | 86400 | 清扫间隔 (秒) |
/// | TASK_COLLECTOR_RUN_ON_START | true | 启动后立即执行第一个周期 |
/// | CACHE_PURGE_INTERVAL | 600 | 过期缓存清理间隔 (秒) |
/// | DEFAULT_EMAIL_ADDRESS | shop.example@platform.com | 通知发件地址 |
/// | BUSINESS_TIMEZONE | UTC | 业务时区 |
/// | PAYMENT_DEADLINE_DAYS | 5 | 默认付款期限 (天) |
/// | SEED_ORDERS | 0 | 启动时生成的测试订单数 |
///
/// # 示例
///
/// ```ignore
/// USE_ASYNC_TASK_COLLECTOR=1 SEED_ORDERS=500 cargo run -p shop-server
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    pub log_level: String,
    pub log_json: bool,
    pub log_dir: Option<String>,

    // === 分页 ===
    pub page_size: usize,
    pub max_page_size: usize,
    pub pagination_orphans: usize,
    /// 页码分页快照
    pub page_cache: CacheNamespace,
    /// 偏移分页快照
    pub offset_cache: CacheNamespace,

    // === 后台任务 ===
    pub use_task_collector: bool,
    pub task_refresh: Duration,
    pub task_run_on_start: bool,
    pub cache_purge_interval: Duration,

    // === 订单 ===
    pub default_email: String,
    pub business_timezone: Tz,
    pub payment_deadline_days: i64,
    pub seed_orders: usize,
}

impl Config {
    /// 从环境变量加载配置
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源加载配置
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let env = Env(&lookup);
        Self {
            http_port: env.parse("HTTP_PORT", 8000),
            environment: env.string("ENVIRONMENT", "development"),
            log_level: env.string("LOG_LEVEL", "info"),
            log_json: env.flag("LOG_JSON", false),
            log_dir: env.optional("LOG_DIR"),

            page_size: env.positive("PAGE_SIZE", 10),
            max_page_size: env.positive("MAX_PAGE_SIZE", 100),
            pagination_orphans: env.parse("PAGINATION_ORPHANS", 0),
            page_cache: CacheNamespace {
                prefix: env.string("FAST_PAGE_PAGINATION_PREFIX", "api_fast_page_pagination"),
                ttl: Duration::from_secs(env.parse("FAST_PAGE_PAGINATION_TIMEOUT", 3600)),
            },
            offset_cache: CacheNamespace {
                prefix: env.string(
                    "FAST_LIMIT_OFFSET_PAGINATION_PREFIX",
                    "api_fast_limit_offset_pagination",
                ),
                ttl: Duration::from_secs(env.parse("FAST_LIMIT_OFFSET_PAGINATION_TIMEOUT", 3600)),
            },

            use_task_collector: env.flag("USE_ASYNC_TASK_COLLECTOR", false),
            task_refresh: Duration::from_secs(env.positive("TASK_COLLECTOR_REFRESH_RATE", 86400)),
            task_run_on_start: env.flag("TASK_COLLECTOR_RUN_ON_START", true),
            cache_purge_interval: Duration::from_secs(env.positive("CACHE_PURGE_INTERVAL", 600)),

            default_email: env.string("DEFAULT_EMAIL_ADDRESS", "shop.example@platform.com"),
            business_timezone: env.timezone("BUSINESS_TIMEZONE"),
            payment_deadline_days: env.parse("PAYMENT_DEADLINE_DAYS", 5),
            seed_orders: env.parse("SEED_ORDERS", 0),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(http_port: u16, page_size: usize) -> Self {
        let mut config = Self::from_env();
        config.http_port = http_port;
        config.page_size = page_size;
        config
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

/// 带回退的环境变量读取
struct Env<'a, F: Fn(&str) -> Option<String>>(&'a F);

impl<F: Fn(&str) -> Option<String>> Env<'_, F> {
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn string(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    fn parse<T: FromStr + Copy + std::fmt::Display>(&self, key: &str, default: T) -> T {
        match self.optional(key) {
            None => default,
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(key, value = %raw, default = %default, "Invalid config value, using default");
                default
            }),
        }
    }

    /// 大于 0 的数值
    fn positive<T>(&self, key: &str, default: T) -> T
    where
        T: FromStr + Copy + std::fmt::Display + PartialOrd + Default,
    {
        let value = self.parse(key, default);
        if value > T::default() {
            value
        } else {
            tracing::warn!(key, default = %default, "Config value must be positive, using default");
            default
        }
    }

    /// `1` / `true` / `yes` / `on` 为真
    fn flag(&self, key: &str, default: bool) -> bool {
        match self.optional(key) {
            None => default,
            Some(raw) => match raw.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    tracing::warn!(key, value = %raw, default, "Invalid flag value, using default");
                    default
                }
            },
        }
    }

    fn timezone(&self, key: &str) -> Tz {
        let Some(raw) = self.optional(key) else {
            return chrono_tz::UTC;
        };
        parse_timezone(&raw).unwrap_or_else(|e| {
            tracing::warn!(key, error = %e, "Invalid timezone, using UTC");
            chrono_tz::UTC
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let c = config(&[]);
        assert_eq!(c.http_port, 8000);
        assert_eq!(c.page_size, 10);
        assert_eq!(c.max_page_size, 100);
        assert_eq!(c.page_cache.prefix, "api_fast_page_pagination");
        assert_eq!(c.page_cache.ttl, Duration::from_secs(3600));
        assert_eq!(c.offset_cache.prefix, "api_fast_limit_offset_pagination");
        assert!(!c.use_task_collector);
        assert_eq!(c.task_refresh, Duration::from_secs(86400));
        assert!(c.task_run_on_start);
        assert_eq!(c.default_email, "shop.example@platform.com");
        assert_eq!(c.business_timezone, chrono_tz::UTC);
        assert_eq!(c.payment_deadline_days, 5);
        assert!(c.log_dir.is_none());
        assert!(c.is_development());
    }

    #[test]
    fn test_overrides_from_env() {
        let c = config(&[
            ("USE_ASYNC_TASK_COLLECTOR", "1"),
            ("TASK_COLLECTOR_REFRESH_RATE", "60"),
            ("FAST_PAGE_PAGINATION_TIMEOUT", "0"),
            ("BUSINESS_TIMEZONE", "Europe/Madrid"),
            ("ENVIRONMENT", "production"),
        ]);
        assert!(c.use_task_collector);
        assert_eq!(c.task_refresh, Duration::from_secs(60));
        assert_eq!(c.page_cache.ttl, Duration::ZERO);
        assert_eq!(c.business_timezone, chrono_tz::Europe::Madrid);
        assert!(c.is_production());
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let c = config(&[
            ("HTTP_PORT", "eighty"),
            ("PAGE_SIZE", "0"),
            ("USE_ASYNC_TASK_COLLECTOR", "maybe"),
            ("BUSINESS_TIMEZONE", "Nowhere/Land"),
            ("LOG_DIR", "  "),
        ]);
        assert_eq!(c.http_port, 8000);
        assert_eq!(c.page_size, 10);
        assert!(!c.use_task_collector);
        assert_eq!(c.business_timezone, chrono_tz::UTC);
        assert!(c.log_dir.is_none());
    }
}
