//! 行情轮询服务
//!
//! 单任务循环：获取行情 → 追加写入文件 → 休眠固定间隔，周而复始。
//! 任何一步失败都只记录日志，下一个周期照常执行。

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::AppConfig;
use crate::models::QuoteRecord;
use crate::services::quote_service::QuoteClient;
use crate::services::storage;

/// 单次轮询的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// 获取并写入成功
    Stored { id: u64 },
    /// 获取成功但写入失败（序号仍然递增）
    StoreFailed { id: u64 },
    /// 获取失败，本周期无数据
    NoData,
}

/// 单只股票的轮询器
pub struct Poller {
    client: QuoteClient,
    symbol: String,
    interval: Duration,
    output: PathBuf,
    // 本进程内的序号，首条记录为 1
    sequence: u64,
}

impl Poller {
    pub fn new(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            client: QuoteClient::new(&config.api)?,
            symbol: config.poller.symbol.clone(),
            interval: config.poller.interval(),
            output: config.poller.output_path(),
            sequence: 0,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn output_path(&self) -> &Path {
        &self.output
    }

    /// 获取行情，失败时记录日志并返回 None
    pub async fn fetch(&self) -> Option<QuoteRecord> {
        match self.client.fetch_quote(&self.symbol).await {
            Ok(record) => Some(record),
            Err(e) => {
                log::error!("[{}] 获取行情数据失败: {:#}", self.symbol, e);
                None
            }
        }
    }

    /// 写入记录，失败时记录日志并返回 false
    pub async fn persist(&self, record: &QuoteRecord) -> bool {
        match storage::append_record(&self.output, record).await {
            Ok(()) => true,
            Err(e) => {
                log::error!("[{}] 保存行情数据失败: {:#}", self.symbol, e);
                false
            }
        }
    }

    /// 执行一次轮询
    pub async fn poll_once(&mut self) -> PollOutcome {
        let Some(mut record) = self.fetch().await else {
            return PollOutcome::NoData;
        };

        self.sequence += 1;
        let id = self.sequence;
        record.assign_id(id);

        let stored = self.persist(&record).await;
        log::info!(
            "[{}] 行情数据已获取: {}",
            self.symbol,
            serde_json::Value::Object(record.fields().clone())
        );

        if stored {
            PollOutcome::Stored { id }
        } else {
            PollOutcome::StoreFailed { id }
        }
    }

    /// 无限轮询，只能由外部终止
    pub async fn run(&mut self) {
        log::info!(
            "[{}] 开始轮询行情接口，间隔 {} 秒，输出 {}",
            self.symbol,
            self.interval.as_secs(),
            self.output.display()
        );

        loop {
            let outcome = self.poll_once().await;
            log::debug!("[{}] 本次轮询结果: {:?}", self.symbol, outcome);
            tokio::time::sleep(self.interval).await;
        }
    }
}
