use serde::{Deserialize, Serialize};

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub matching: MatchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// 远端 POS 后端
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
    pub store_id: Option<i64>,
}

/// 匹配阈值 (0-1 置信度), 显式配置项而非隐藏全局量
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchConfig {
    /// 达到即判定命中
    pub exact_match_threshold: f64,
    /// 达到 (但低于命中线) 判定疑似, 交给用户确认
    pub partial_match_threshold: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            exact_match_threshold: 0.9,
            partial_match_threshold: 0.6,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            backend: BackendConfig {
                base_url: "http://localhost:3000".to_string(),
                store_id: None,
            },
            matching: MatchConfig::default(),
        }
    }
}

impl AppConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Self {
        let defaults = MatchConfig::default();
        Self {
            server: ServerConfig {
                host: std::env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
                port: std::env::var("SERVER_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8080),
            },
            backend: BackendConfig {
                base_url: std::env::var("POS_BACKEND_URL")
                    .unwrap_or_else(|_| "http://localhost:3000".to_string()),
                store_id: std::env::var("POS_STORE_ID").ok().and_then(|v| v.parse().ok()),
            },
            matching: MatchConfig {
                exact_match_threshold: std::env::var("MATCH_EXACT_THRESHOLD")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.exact_match_threshold),
                partial_match_threshold: std::env::var("MATCH_PARTIAL_THRESHOLD")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.partial_match_threshold),
            },
        }
    }
}
