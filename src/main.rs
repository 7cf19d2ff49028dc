use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use log::{info, warn};
use std::path::PathBuf;
use std::process::ExitCode;
use video_mosaic_catalog::component::ThumbnailCatalogGenerator;
use video_mosaic_catalog::component::mosaic_generator::GenerationResult;
use video_mosaic_catalog::config::{Config, save_settings};
use video_mosaic_catalog::init;
use video_mosaic_catalog::signal::setup_shutdown_signal;
use video_mosaic_catalog::tools::SqliteCatalog;

/// 掃描影片資料夾，為每部影片產生 N x N 預覽圖並寫入目錄資料庫
#[derive(Debug, Parser)]
#[command(name = "video-mosaic-catalog", version, about)]
struct Cli {
    /// 影片資料夾
    source_dir: PathBuf,

    /// 預覽圖輸出資料夾
    output_dir: PathBuf,

    /// 期望的取樣間隔（秒）
    #[arg(short, long)]
    interval: Option<f64>,

    /// 每部影片的擷取執行緒上限
    #[arg(short, long)]
    workers: Option<usize>,

    /// 目錄資料庫路徑
    #[arg(short, long)]
    catalog: Option<PathBuf>,

    /// 設定檔路徑（預設為工作目錄下的 settings.json）
    #[arg(long)]
    config: Option<PathBuf>,

    /// 將生效的設定寫回設定檔
    #[arg(long)]
    save_config: bool,

    /// 不顯示進度條
    #[arg(short, long)]
    quiet: bool,

    /// 輸出更多日誌（-v: info, -vv: debug）
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init::init_with_level(match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    });

    let mut config = Config::new(cli.config.as_deref())?;
    if let Some(interval) = cli.interval {
        config.settings.sample_interval = interval;
    }
    if let Some(workers) = cli.workers {
        config.settings.worker_count = workers;
    }
    if let Some(catalog) = cli.catalog {
        config.settings.catalog_path = catalog;
    }
    config.settings.validate()?;

    if cli.save_config {
        save_settings(&config.settings, &config.settings_path)?;
        info!("設定已寫入: {}", config.settings_path.display());
    }

    let shutdown_signal = setup_shutdown_signal()?;
    let mut catalog = SqliteCatalog::open(&config.settings.catalog_path).with_context(|| {
        format!(
            "無法開啟目錄資料庫: {}",
            config.settings.catalog_path.display()
        )
    })?;

    let mut generator = ThumbnailCatalogGenerator::new(config.settings, shutdown_signal);
    if cli.quiet {
        generator = generator.quiet();
    }

    let outcome = generator.run(&cli.source_dir, &cli.output_dir, &mut catalog);
    Ok(if report_outcome(outcome) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// 回報執行結果；錯誤只在這裡印出一次
fn report_outcome(outcome: Result<GenerationResult>) -> bool {
    match outcome {
        Ok(result) => {
            info!(
                "程式正常結束，新增 {} 筆預覽圖",
                result.generated.len()
            );
            true
        }
        Err(e) => {
            warn!("程式錯誤: {e:#}");
            eprintln!("{} {:#}", style("錯誤:").red().bold(), e);
            false
        }
    }
}
