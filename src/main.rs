// ==========================================
// 库存文件导入系统 - 命令行入口
// ==========================================
// 职责: 唯一组装点（配置 -> 存储会话 -> 导入管道 -> 结果输出）
// 退出码: 0 = 导入完成；1 = 准备阶段或运行中止
// ==========================================

use anyhow::Context;
use clap::Parser;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};
use std::path::PathBuf;
use std::process;
use std::rc::Rc;
use stock_import::config::ImportConfig;
use stock_import::db::{init_schema, open_sqlite_connection};
use stock_import::importer::{stock_file_importer, CancelSaveListener, EventDispatcher};
use stock_import::{logging, FileHeaders, ImportResult, SqliteProductStore, StockFileColumn};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "stock-import")]
#[command(author, version, about = "导入库存 CSV 文件", long_about = None)]
struct Cli {
    /// 库存 CSV 文件路径
    #[arg(short, long, default_value = "tests/files/stock.csv")]
    file: PathBuf,

    /// 试运行：校验全部记录但不落库
    #[arg(short, long)]
    test: bool,

    /// JSON 配置文件
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 数据库文件路径
    #[arg(long, env = "STOCK_IMPORT_DB_PATH")]
    db: Option<String>,

    /// 每批提交的记录数
    #[arg(long)]
    batch_size: Option<usize>,

    /// 以 JSON 输出导入结果（日志同时切换为 JSON）
    #[arg(long)]
    json: bool,
}

fn main() {
    let cli = Cli::parse();

    if cli.json {
        logging::init_json();
    } else {
        logging::init();
    }

    info!(version = stock_import::VERSION, "{}", stock_import::APP_NAME);

    match run(&cli) {
        Ok(()) => {}
        Err(e) => {
            error!(error = %e, "导入失败");
            eprintln!("错误: {:#}", e);
            process::exit(1);
        }
    }
}

/// 加载配置（配置文件 -> 环境变量 -> 命令行参数）
fn load_config(cli: &Cli) -> anyhow::Result<ImportConfig> {
    let mut config = match &cli.config {
        Some(path) => ImportConfig::from_file(path)
            .with_context(|| format!("无法加载配置文件 {}", path.display()))?,
        None => ImportConfig::default(),
    };
    config.apply_env_overrides()?;

    if let Some(db) = &cli.db {
        config.database_path = Some(db.clone());
    }
    if let Some(batch_size) = cli.batch_size {
        config.batch_size = batch_size;
    }

    config.validate()?;
    Ok(config)
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = load_config(cli)?;

    let db_path = config.database_path();
    info!(db_path = %db_path, "使用数据库");
    let conn = open_sqlite_connection(&db_path).with_context(|| format!("无法打开数据库 {}", db_path))?;
    init_schema(&conn).context("数据库初始化失败")?;

    let dispatcher = Rc::new(EventDispatcher::new());
    if cli.test {
        info!("试运行模式，记录不会落库");
        dispatcher.add_before_persist_listener(CancelSaveListener);
    }

    let mut importer = stock_file_importer(
        SqliteProductStore::from_connection(conn),
        dispatcher,
        config.batch_size,
        config.unique_fields.clone(),
    )?;

    let headers = config.file_headers();
    let result = importer.import(&cli.file, &headers)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", format_report(&result, &headers));
    }
    Ok(())
}

/// 错误明细表 + 汇总
fn format_report(result: &ImportResult, headers: &FileHeaders) -> String {
    let mut out = String::new();

    if result.has_errors() {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_header(vec!["产品代码", "列", "错误"]);

        let code_header = headers.get(StockFileColumn::Code);
        for entry in result.errors() {
            let mut identifier = entry.subject.identifier(code_header);
            if let Some(line) = entry.subject.line() {
                identifier = format!("{} (第 {} 行)", identifier, line);
            }
            for (column, message) in &entry.fields {
                table.add_row(vec![identifier.clone(), column.clone(), message.clone()]);
            }
        }
        out.push_str(&format!("{}\n", table));
    }

    out.push_str(&format!("已处理: {}\n", result.processed()));
    out.push_str(&format!("成功:   {}\n", result.success()));
    out.push_str(&format!("跳过:   {}\n", result.skipped()));
    out.push_str(&format!("否决:   {}\n", result.vetoed()));
    out
}
