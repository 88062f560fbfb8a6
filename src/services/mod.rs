//! 业务逻辑服务模块
//!
//! 封装行情获取、落盘、轮询和进程启动逻辑

pub mod quote_service; // 行情接口客户端
pub mod storage;       // 记录落盘
pub mod poller;        // 轮询循环
pub mod launcher;      // 轮询进程启动器
