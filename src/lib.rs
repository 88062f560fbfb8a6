//! 行情轮询服务
//!
//! 定时轮询第三方行情接口，将原始 JSON 附加序号后按行追加到每只股票的文件中；
//! 启动器为每只股票启动一个独立的轮询进程

pub mod config;   // 配置加载
pub mod models;   // 数据模型定义
pub mod services; // 业务逻辑服务
