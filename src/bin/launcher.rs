//! 轮询进程启动器
//!
//! 按配置为每只股票启动一个 quote-poller 进程，间隔 1 秒，随后监管子进程直到全部退出

use env_logger::Env;
use tokio::signal;

use quote_poller::config::AppConfig;
use quote_poller::services::launcher::{self, Launcher, ProcessSpawner};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config_path = AppConfig::locate();
    let config = AppConfig::load(config_path.as_deref());
    config.validate()?;

    let launcher = Launcher::new(&config.launcher);
    let mut spawner = ProcessSpawner::from_config(&config.launcher, config_path)?;

    log::info!("准备启动 {} 个轮询进程", launcher.entries().len());
    let mut children = launcher.launch_all(&mut spawner).await;

    if children.is_empty() {
        log::warn!("没有成功启动的轮询进程，启动器退出");
        return Ok(());
    }

    let interrupted = tokio::select! {
        _ = launcher::supervise(&mut children) => false,
        _ = signal::ctrl_c() => true,
    };

    if interrupted {
        log::info!("收到退出信号，终止 {} 个轮询进程", children.len());
        launcher::shutdown(&mut children).await;
    } else {
        log::info!("所有轮询进程均已退出");
    }

    Ok(())
}
