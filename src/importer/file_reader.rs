// ==========================================
// 库存文件导入系统 - CSV 文件读取器
// ==========================================
// 职责: 文件存在/格式/内容校验 + 惰性逐行读取
// 红线: 不一次性加载整个文件，按需拉取
// ==========================================

use crate::domain::RawRow;
use crate::importer::error::{ImportError, Result};
use crate::importer::header_normalizer::normalize_header;
use crate::importer::importer_trait::FileReader;
use csv::{ReaderBuilder, StringRecordsIntoIter};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// 内容嗅探的字节数
const SNIFF_BYTES: usize = 1024;

// ==========================================
// CsvFileReader
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct CsvFileReader {
    path: Option<PathBuf>,
}

impl CsvFileReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// 检查扩展名（大小写不敏感）
    fn check_extension(path: &Path) -> Result<()> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_string();
        if !ext.eq_ignore_ascii_case("csv") {
            return Err(ImportError::UnsupportedFormat(ext));
        }
        Ok(())
    }

    /// 检查内容：非空、文本（无 NUL 字节、UTF-8）
    fn check_content(path: &Path) -> Result<()> {
        let mut file = File::open(path)?;
        let mut buf = Vec::with_capacity(SNIFF_BYTES);
        file.by_ref().take(SNIFF_BYTES as u64).read_to_end(&mut buf)?;

        if buf.is_empty() {
            return Err(ImportError::InvalidFormat(format!("文件为空: {}", path.display())));
        }
        if buf.contains(&0) {
            return Err(ImportError::InvalidFormat(format!("不是文本文件: {}", path.display())));
        }
        // 截断处的半个字符不算错误
        if let Err(e) = std::str::from_utf8(&buf) {
            if e.error_len().is_some() {
                return Err(ImportError::InvalidFormat(format!(
                    "文件编码不是 UTF-8: {}",
                    path.display()
                )));
            }
        }
        Ok(())
    }
}

impl FileReader for CsvFileReader {
    type Rows = CsvRows;

    fn set_file_path(&mut self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }
        Self::check_extension(path)?;
        Self::check_content(path)?;

        debug!(path = %path.display(), "源文件校验通过");
        self.path = Some(path.to_path_buf());
        Ok(())
    }

    fn rows(&self) -> Result<CsvRows> {
        let path = self
            .path
            .as_deref()
            .ok_or_else(|| ImportError::InternalError("未设置源文件路径".to_string()))?;

        let file = File::open(path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        let headers: Vec<String> = reader.headers()?.iter().map(normalize_header).collect();
        debug!(headers = ?headers, "表头已规范化");

        Ok(CsvRows {
            headers,
            records: reader.into_records(),
        })
    }
}

// ==========================================
// CsvRows - 惰性行序列
// ==========================================
// 文件句柄随序列耗尽或被丢弃而释放
pub struct CsvRows {
    headers: Vec<String>,
    records: StringRecordsIntoIter<File>,
}

impl CsvRows {
    pub fn headers(&self) -> &[String] {
        &self.headers
    }
}

impl Iterator for CsvRows {
    type Item = Result<RawRow>;

    fn next(&mut self) -> Option<Self::Item> {
        // 真正的空行由 csv 跳过；只含分隔符的行照常产出，交给行校验拒绝
        let record = match self.records.next()? {
            Ok(record) => record,
            Err(e) => return Some(Err(e.into())),
        };
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        // 多出的值被忽略，缺少的列不产生 key
        let values: HashMap<String, String> = self
            .headers
            .iter()
            .zip(record.iter())
            .map(|(header, value)| (header.clone(), value.trim().to_string()))
            .collect();

        Some(Ok(RawRow::new(line, values)))
    }
}
