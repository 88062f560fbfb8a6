//! 行情记录落盘
//!
//! 每只股票一个文件，按行追加 JSON（NDJSON），只追加不截断

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::ser::{Formatter, Serializer};
use std::io;
use std::path::Path;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use crate::models::QuoteRecord;

/// 分隔符带空格的紧凑格式: {"c": 150.2, "h": 151.0, "id": 1}
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

/// 将记录序列化为单行 JSON（含结尾换行）
pub fn to_json_line(record: &QuoteRecord) -> Result<String> {
    let mut buf = Vec::with_capacity(128);
    let mut ser = Serializer::with_formatter(&mut buf, SpacedFormatter);
    record.serialize(&mut ser).context("序列化行情记录失败")?;
    buf.push(b'\n');

    String::from_utf8(buf).context("序列化结果不是合法 UTF-8")
}

/// 追加一条记录到文件，文件不存在时自动创建
pub async fn append_record(path: &Path, record: &QuoteRecord) -> Result<()> {
    let line = to_json_line(record)?;

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .with_context(|| format!("打开文件 {} 失败", path.display()))?;

    // 整行一次写入
    file.write_all(line.as_bytes())
        .await
        .with_context(|| format!("写入文件 {} 失败", path.display()))?;
    file.flush().await?;

    Ok(())
}
