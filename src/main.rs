//! 行情轮询程序
//!
//! 对单只股票按固定间隔轮询行情接口，结果追加到 stock_data_<SYMBOL>.json

use env_logger::Env;
use tokio::signal;

use quote_poller::config::AppConfig;
use quote_poller::services::poller::Poller;

/// 应用程序入口
///
/// 单线程运行时：获取、写入、休眠依次执行，互不重叠
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // 初始化日志系统，默认日志级别为 info
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config_path = AppConfig::locate();
    let config = AppConfig::load(config_path.as_deref());
    config.validate()?;

    let mut poller = Poller::new(&config)?;
    log::info!("启动股票 {} 的行情轮询", poller.symbol());

    tokio::select! {
        _ = poller.run() => {}
        _ = signal::ctrl_c() => {
            log::info!("收到退出信号，停止轮询股票 {}", config.poller.symbol);
        }
    }

    Ok(())
}
