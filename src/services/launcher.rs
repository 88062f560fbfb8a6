//! 轮询进程启动器
//!
//! 按配置顺序为每只股票启动一个独立的轮询进程，相邻两次启动间隔固定时间。
//! 单个进程启动失败不影响后续启动项。启动完成后持有子进程句柄，
//! 等待并记录每个子进程的退出状态。

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::env;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::process::{Child, Command};

use crate::config::{LauncherConfig, ENV_CONFIG_PATH, ENV_SYMBOL};
use crate::models::LaunchEntry;

/// 轮询程序的默认可执行文件名
pub const POLLER_BIN: &str = "quote-poller";

/// 启动进程的抽象，便于测试
pub trait Spawner {
    type Handle;

    fn spawn(&mut self, entry: &LaunchEntry) -> Result<Self::Handle>;
}

/// 已启动的启动项
#[derive(Debug)]
pub struct Launched<H> {
    pub entry: LaunchEntry,
    pub handle: H,
}

/// 启动器
pub struct Launcher {
    entries: Vec<LaunchEntry>,
    stagger: Duration,
}

impl Launcher {
    pub fn new(config: &LauncherConfig) -> Self {
        Self {
            entries: config.entries.clone(),
            stagger: config.stagger(),
        }
    }

    pub fn entries(&self) -> &[LaunchEntry] {
        &self.entries
    }

    /// 依次启动所有启动项
    ///
    /// N 个启动项恰好尝试 N 次，相邻两次尝试之间至少间隔 stagger
    pub async fn launch_all<S: Spawner>(&self, spawner: &mut S) -> Vec<Launched<S::Handle>> {
        let mut launched = Vec::with_capacity(self.entries.len());

        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.stagger).await;
            }

            log::info!("启动股票 {} 的轮询进程...", entry.symbol);
            match spawner.spawn(entry) {
                Ok(handle) => launched.push(Launched {
                    entry: entry.clone(),
                    handle,
                }),
                Err(e) => {
                    log::error!("启动股票 {} 的轮询进程失败: {:#}", entry.symbol, e);
                }
            }
        }

        log::info!(
            "启动完成: 成功 {} 个，失败 {} 个",
            launched.len(),
            self.entries.len() - launched.len()
        );
        launched
    }
}

/// 基于操作系统进程的启动实现
pub struct ProcessSpawner {
    default_program: PathBuf,
    config_path: Option<PathBuf>,
}

impl ProcessSpawner {
    pub fn new(default_program: PathBuf, config_path: Option<PathBuf>) -> Self {
        Self {
            default_program,
            config_path,
        }
    }

    /// 根据配置确定默认轮询程序：配置优先，否则取启动器同目录下的 quote-poller
    pub fn from_config(config: &LauncherConfig, config_path: Option<PathBuf>) -> Result<Self> {
        let program = match &config.program {
            Some(program) => PathBuf::from(program),
            None => sibling_executable(POLLER_BIN)?,
        };

        // 子进程的工作目录可能不同，传绝对路径
        let config_path = match config_path {
            Some(path) if path.is_relative() => Some(env::current_dir()?.join(path)),
            other => other,
        };

        Ok(Self::new(program, config_path))
    }

    fn program_for<'a>(&'a self, entry: &'a LaunchEntry) -> &'a Path {
        entry
            .program
            .as_deref()
            .map(Path::new)
            .unwrap_or(self.default_program.as_path())
    }
}

impl Spawner for ProcessSpawner {
    type Handle = SupervisedChild;

    fn spawn(&mut self, entry: &LaunchEntry) -> Result<SupervisedChild> {
        let program = self.program_for(entry);

        let mut command = Command::new(program);
        command
            .args(&entry.args)
            .env(ENV_SYMBOL, &entry.symbol)
            .stdin(Stdio::null());
        if let Some(path) = &self.config_path {
            command.env(ENV_CONFIG_PATH, path);
        }

        let child = command
            .spawn()
            .with_context(|| format!("无法执行 {}", program.display()))?;

        log::info!(
            "已启动 {} (pid {:?}) 用于股票 {}",
            program.display(),
            child.id(),
            entry.symbol
        );

        Ok(SupervisedChild {
            symbol: entry.symbol.clone(),
            child,
            started_at: Utc::now(),
        })
    }
}

/// 被监管的子进程
#[derive(Debug)]
pub struct SupervisedChild {
    symbol: String,
    child: Child,
    started_at: DateTime<Utc>,
}

impl SupervisedChild {
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// 等待子进程结束并记录退出状态
    pub async fn wait(&mut self) -> Result<ExitStatus> {
        let result = self.child.wait().await;
        let uptime = Utc::now() - self.started_at;

        match &result {
            Ok(status) if status.success() => {
                log::info!(
                    "股票 {} 的轮询进程已退出: {}，运行 {} 秒",
                    self.symbol,
                    status,
                    uptime.num_seconds()
                );
            }
            Ok(status) => {
                log::warn!(
                    "股票 {} 的轮询进程异常退出: {}，运行 {} 秒",
                    self.symbol,
                    status,
                    uptime.num_seconds()
                );
            }
            Err(e) => {
                log::error!("等待股票 {} 的轮询进程失败: {}", self.symbol, e);
            }
        }

        result.map_err(|e| anyhow!("等待子进程失败: {}", e))
    }

    /// 终止子进程
    pub fn kill(&mut self) {
        if let Err(e) = self.child.start_kill() {
            log::warn!("终止股票 {} 的轮询进程失败: {}", self.symbol, e);
        }
    }
}

/// 等待全部子进程结束，返回各自的退出状态（与输入顺序一致）
pub async fn supervise(children: &mut [Launched<SupervisedChild>]) -> Vec<Result<ExitStatus>> {
    join_all(children.iter_mut().map(|c| c.handle.wait())).await
}

/// 终止全部子进程并等待它们退出
pub async fn shutdown(children: &mut [Launched<SupervisedChild>]) -> Vec<Result<ExitStatus>> {
    for launched in children.iter_mut() {
        launched.handle.kill();
    }
    supervise(children).await
}

/// 获取与当前可执行文件同目录的程序路径
fn sibling_executable(name: &str) -> Result<PathBuf> {
    let exe = env::current_exe().context("无法获取当前可执行文件路径")?;
    let dir = exe
        .parent()
        .ok_or_else(|| anyhow!("无法获取可执行文件目录: {}", exe.display()))?;
    Ok(dir.join(format!("{}{}", name, env::consts::EXE_SUFFIX)))
}
