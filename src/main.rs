// ==========================================
// 设备台账批量导入 - 命令行入口
// ==========================================
// 用法: device-import <FILE> [--config PATH] [--json] [--log-json]
// 退出码: 0 = 已处理（可能部分失败）；1 = 整批拒绝或启动失败
// ==========================================

use anyhow::Context;
use clap::Parser;
use device_import::{logging, ImportApi, ImportConfig, ImportReport};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

#[derive(Parser, Debug)]
#[command(name = "device-import", version, about = "Bulk import devices from CSV / Excel into the registry")]
struct CliArgs {
    /// 待导入文件（.csv / .xlsx）
    file: PathBuf,

    /// 配置文件路径
    #[arg(short, long, env = "DEVICE_IMPORT_CONFIG")]
    config: Option<PathBuf>,

    /// 以 JSON 输出导入报告
    #[arg(long)]
    json: bool,

    /// 以 JSON 输出日志
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();

    if args.log_json {
        logging::init_json();
    } else {
        logging::init();
    }

    match run(args).await {
        Ok(report) if !report.summary.is_rejected() => {}
        Ok(_) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

async fn run(args: CliArgs) -> anyhow::Result<ImportReport> {
    tracing::info!("{} {}", device_import::APP_NAME, device_import::VERSION);

    let config = ImportConfig::load(args.config.as_deref()).context("加载配置失败")?;
    let api = ImportApi::from_config(&config).context("初始化注册服务客户端失败")?;

    // Ctrl-C 只在行与行之间生效，已提交的行不受影响
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("收到中断信号，当前行完成后停止导入");
            on_signal.cancel();
        }
    });

    let report = api.import_file(&args.file, &cancel).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(report)
}

fn print_report(report: &ImportReport) {
    println!("{}", report.summary.message());
    println!("Total rows:   {}", report.total_rows);
    println!("Imported:     {}", report.success_count);
    println!("Errors:       {}", report.error_count());

    if !report.errors.is_empty() {
        println!();
        for error in &report.errors {
            println!("  row {:>5}: {}", error.row_number, error.message);
        }
    }
}
