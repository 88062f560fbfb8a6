//! 配置模块
//!
//! 支持从 JSON 文件加载系统配置，并允许环境变量覆盖关键字段

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::models::LaunchEntry;

/// 配置文件路径环境变量
pub const ENV_CONFIG_PATH: &str = "QUOTE_CONFIG";
/// 行情接口地址环境变量
pub const ENV_API_URL: &str = "QUOTE_API_URL";
/// 行情接口 Token 环境变量
pub const ENV_API_TOKEN: &str = "QUOTE_API_TOKEN";
/// 轮询股票代码环境变量（启动器通过它把代码传给子进程）
pub const ENV_SYMBOL: &str = "QUOTE_SYMBOL";

/// 行情接口配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// 行情接口地址
    #[serde(default = "default_url")]
    pub url: String,
    /// 访问 Token（作为 query 参数传递）
    #[serde(default)]
    pub token: String,
    /// 请求超时时间（秒）
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// 连接超时时间（秒）
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

/// 轮询配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollerConfig {
    /// 股票代码
    #[serde(default = "default_symbol")]
    pub symbol: String,
    /// 轮询间隔（秒）
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
    /// 输出目录，文件名固定为 stock_data_<SYMBOL>.json
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

/// 启动器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LauncherConfig {
    /// 相邻两次启动之间的间隔（秒）
    #[serde(default = "default_stagger")]
    pub stagger_secs: u64,
    /// 默认的轮询程序路径（为空则使用启动器同目录下的 quote-poller）
    #[serde(default)]
    pub program: Option<String>,
    /// 启动列表，按顺序启动
    #[serde(default = "default_entries")]
    pub entries: Vec<LaunchEntry>,
}

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// 行情接口配置
    #[serde(default)]
    pub api: ApiConfig,
    /// 轮询配置
    #[serde(default)]
    pub poller: PollerConfig,
    /// 启动器配置
    #[serde(default)]
    pub launcher: LauncherConfig,
}

// 默认值函数
fn default_url() -> String { "https://finnhub.io/api/v1/quote".to_string() }
fn default_timeout() -> u64 { 30 }
fn default_connect_timeout() -> u64 { 10 }
fn default_symbol() -> String { "SAP".to_string() }
fn default_interval() -> u64 { 5 }
fn default_output_dir() -> PathBuf { PathBuf::from(".") }
fn default_stagger() -> u64 { 1 }
fn default_entries() -> Vec<LaunchEntry> {
    ["AAPL", "NVDA", "TSLA", "SAP"]
        .iter()
        .map(|symbol| LaunchEntry::new(*symbol))
        .collect()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            token: String::new(),
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            interval_secs: default_interval(),
            output_dir: default_output_dir(),
        }
    }
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            stagger_secs: default_stagger(),
            program: None,
            entries: default_entries(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl PollerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// 获取当前股票的输出文件路径
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(format!("stock_data_{}.json", self.symbol))
    }
}

impl LauncherConfig {
    pub fn stagger(&self) -> Duration {
        Duration::from_secs(self.stagger_secs)
    }
}

impl AppConfig {
    /// 从 JSON 文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// 查找配置文件：优先 $QUOTE_CONFIG，其次 config.json、config/config.json
    pub fn locate() -> Option<PathBuf> {
        if let Ok(path) = env::var(ENV_CONFIG_PATH) {
            return Some(PathBuf::from(path));
        }

        ["config.json", "config/config.json"]
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// 加载配置，优先从文件，失败则使用默认值，最后应用环境变量覆盖
    pub fn load(path: Option<&Path>) -> Self {
        let config = match path {
            Some(path) => match Self::from_file(path) {
                Ok(config) => {
                    log::info!("从 {} 加载配置成功", path.display());
                    config
                }
                Err(e) => {
                    log::warn!("加载配置文件 {} 失败: {}，使用默认配置", path.display(), e);
                    Self::default()
                }
            },
            None => {
                log::info!("未找到配置文件，使用默认配置");
                Self::default()
            }
        };

        config.override_with_env()
    }

    /// 将环境变量中的设定值覆盖到配置上
    pub fn override_with_env(self) -> Self {
        self.apply_overrides(|key| env::var(key).ok())
    }

    fn apply_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL) {
            self.api.url = url;
        }

        if let Some(token) = lookup(ENV_API_TOKEN) {
            self.api.token = token;
        }

        if let Some(symbol) = lookup(ENV_SYMBOL) {
            self.poller.symbol = symbol;
        }

        self
    }

    /// 校验配置，Token 缺失只给出警告
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.api.url)
            .map_err(|e| anyhow!("行情接口地址无效 {}: {}", self.api.url, e))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(anyhow!("行情接口地址必须是 http/https: {}", self.api.url));
        }

        if self.poller.symbol.trim().is_empty() {
            return Err(anyhow!("股票代码不能为空"));
        }

        if self.poller.interval_secs == 0 {
            return Err(anyhow!("轮询间隔必须大于 0 秒"));
        }

        if let Some(pos) = self
            .launcher
            .entries
            .iter()
            .position(|entry| entry.symbol.trim().is_empty())
        {
            return Err(anyhow!("启动列表第 {} 项缺少股票代码", pos + 1));
        }

        if self.api.token.is_empty() {
            log::warn!("未设置 {} 环境变量或 api.token，请求可能被拒绝", ENV_API_TOKEN);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.api.url, "https://finnhub.io/api/v1/quote");
        assert!(config.api.token.is_empty());
        assert_eq!(config.poller.interval(), Duration::from_secs(5));
        assert_eq!(config.launcher.stagger(), Duration::from_secs(1));

        let symbols: Vec<&str> = config
            .launcher
            .entries
            .iter()
            .map(|e| e.symbol.as_str())
            .collect();
        assert_eq!(symbols, vec!["AAPL", "NVDA", "TSLA", "SAP"]);
    }

    #[test]
    fn test_output_path() {
        let mut poller = PollerConfig::default();
        poller.symbol = "NVDA".to_string();
        poller.output_dir = PathBuf::from("/data/quotes");

        assert_eq!(
            poller.output_path(),
            PathBuf::from("/data/quotes/stock_data_NVDA.json")
        );
    }

    /// 部分字段缺失时使用默认值
    #[test]
    fn test_partial_json() {
        let json = r#"{
            "api": { "token": "abc" },
            "poller": { "symbol": "TSLA" },
            "launcher": { "entries": [ { "symbol": "TSLA", "args": ["-v"] } ] }
        }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.api.token, "abc");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.poller.symbol, "TSLA");
        assert_eq!(config.poller.interval_secs, 5);
        assert_eq!(config.launcher.entries.len(), 1);
        assert_eq!(config.launcher.entries[0].args, vec!["-v".to_string()]);
        assert!(config.launcher.entries[0].program.is_none());
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            (ENV_API_URL, "http://127.0.0.1:9000/quote"),
            (ENV_API_TOKEN, "secret"),
            (ENV_SYMBOL, "AAPL"),
        ]
        .into_iter()
        .collect();

        let config = AppConfig::default()
            .apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.api.url, "http://127.0.0.1:9000/quote");
        assert_eq!(config.api.token, "secret");
        assert_eq!(config.poller.symbol, "AAPL");
        assert_eq!(
            config.poller.output_path(),
            PathBuf::from("./stock_data_AAPL.json")
        );
    }

    #[test]
    fn test_validate() {
        assert!(AppConfig::default().validate().is_ok());

        let mut config = AppConfig::default();
        config.api.url = "not a url".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.api.url = "ftp://example.com/quote".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.poller.symbol = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.poller.interval_secs = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.launcher.entries.push(LaunchEntry::new(""));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("第 5 项"));
    }

    #[test]
    fn test_from_file_missing() {
        let path = env::temp_dir().join("quote-poller-missing-config.json");
        let config = AppConfig::from_file(&path);
        assert!(config.is_err());
    }
}
