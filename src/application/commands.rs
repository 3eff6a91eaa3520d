//! CLI commands and handlers
use clap::{Parser, Subcommand};
use std::time::Duration;
use tracing::info;

use crate::application::services::ArbitrageService;
use crate::domain::pool::PoolManager;
use crate::report::ArbitrageReport;
use crate::shared::errors::AppError;
use crate::shared::types::PoolsConfig;
use crate::shared::utils::{calculate_percentage_change, format_amount};

#[derive(Parser)]
#[command(name = "ammarb")]
#[command(about = "Constant-product AMM simulator and cross-pool arbitrage finder")]
pub struct Cli {
    /// Path to the pool config file (.json or .toml)
    #[arg(long, default_value = "config.json")]
    pub config: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List configured pools
    Pools,

    /// Look for arbitrage between every pair of pools
    Scan {
        /// Print reports as JSON
        #[arg(long)]
        json: bool,

        /// Minimum profit in ETH for an opportunity to be listed
        #[arg(long, default_value_t = 0.0)]
        min_profit: f64,
    },

    /// Execute the most profitable opportunity against the pools
    Execute {
        /// Minimum profit in ETH
        #[arg(long, default_value_t = 0.0)]
        min_profit: f64,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Scan repeatedly while a simulated user trades against the pools
    Monitor {
        /// Scan interval in milliseconds
        #[arg(short, long, default_value_t = 500)]
        interval: u64,

        /// Number of scans
        #[arg(short = 'n', long, default_value_t = 10)]
        iterations: usize,

        /// Number of random user swaps
        #[arg(short, long, default_value_t = 20)]
        trades: usize,

        /// Execute the best opportunity on each scan
        #[arg(short, long, default_value_t = false)]
        auto_execute: bool,

        /// Minimum profit in ETH
        #[arg(long, default_value_t = 0.0)]
        min_profit: f64,
    },
}

pub struct CommandExecutor;

impl CommandExecutor {
    /// Execute the selected command
    pub async fn execute(command: Commands, config: PoolsConfig) -> Result<(), AppError> {
        let pools = PoolManager::from_config(&config)?;
        if pools.is_empty() {
            return Err(AppError::ConfigError("no pools configured".to_string()));
        }

        match command {
            Commands::Pools => Self::execute_pools_command(pools).await,
            Commands::Scan { json, min_profit } => {
                Self::execute_scan_command(pools, json, min_profit).await
            }
            Commands::Execute { min_profit, json } => {
                Self::execute_execute_command(pools, min_profit, json).await
            }
            Commands::Monitor { interval, iterations, trades, auto_execute, min_profit } => {
                Self::execute_monitor_command(pools, interval, iterations, trades, auto_execute, min_profit).await
            }
        }
    }

    async fn execute_pools_command(pools: PoolManager) -> Result<(), AppError> {
        println!(
            "{:<10} {:>14} {:>14} {:>8} {:>12} {:>16} {:>14}",
            "POOL", "DAI", "ETH", "FEE", "RATIO-K", "PRODUCT-K", "SHARES"
        );
        for pool in pools.snapshot_all().await {
            let ratio = pool
                .ratio_k()
                .map(format_amount)
                .unwrap_or_else(|_| "-".to_string());
            println!(
                "{:<10} {:>14} {:>14} {:>8} {:>12} {:>16} {:>14}",
                pool.name(),
                format_amount(pool.reserves().dai),
                format_amount(pool.reserves().eth),
                pool.fee_rate(),
                ratio,
                format_amount(pool.product_k()),
                format_amount(pool.total_shares()),
            );
        }
        Ok(())
    }

    async fn execute_scan_command(pools: PoolManager, json: bool, min_profit: f64) -> Result<(), AppError> {
        let service = ArbitrageService::new(pools, min_profit);
        let reports: Vec<_> = service
            .scan_all()
            .await
            .into_iter()
            .filter(|report| !report.is_opportunity() || report.profit >= min_profit)
            .collect();

        if json {
            let out = serde_json::to_string_pretty(&reports)
                .map_err(|e| AppError::Unknown(e.to_string()))?;
            println!("{}", out);
            return Ok(());
        }

        for report in &reports {
            print_report(report);
        }
        Ok(())
    }

    async fn execute_execute_command(pools: PoolManager, min_profit: f64, json: bool) -> Result<(), AppError> {
        let service = ArbitrageService::new(pools, min_profit);
        let Some(report) = service.execute_best().await? else {
            println!("No profitable arbitrage opportunity");
            return Ok(());
        };

        if json {
            let out = report.to_json().map_err(|e| AppError::Unknown(e.to_string()))?;
            println!("{}", out);
            return Ok(());
        }

        print_report(&report);
        if let Some(execution) = &report.execution {
            println!(
                "  executed: {} ETH -> {} DAI -> {} ETH, realized profit {} ETH ({:.4}%)",
                format_amount(execution.amount_in),
                format_amount(execution.intermediate_dai),
                format_amount(execution.amount_out),
                format_amount(execution.realized_profit),
                execution.roi(),
            );
        }

        for summary in &report.pools {
            let after = service.pools().snapshot(summary.id).await?;
            if let (Some(before_k), Ok(after_k)) = (summary.ratio_k, after.ratio_k()) {
                println!(
                    "  {}: ratio-K {} -> {} ({:+.4}%)",
                    summary.name,
                    format_amount(before_k),
                    format_amount(after_k),
                    calculate_percentage_change(before_k, after_k),
                );
            }
        }
        Ok(())
    }

    async fn execute_monitor_command(
        pools: PoolManager,
        interval: u64,
        iterations: usize,
        trades: usize,
        auto_execute: bool,
        min_profit: f64,
    ) -> Result<(), AppError> {
        info!(interval_ms = interval, iterations, trades, auto_execute, "Starting arbitrage monitor");
        let service = ArbitrageService::new(pools, min_profit);
        let stats = service
            .monitor(Duration::from_millis(interval), iterations, trades, auto_execute)
            .await;

        println!("Scans:               {}", stats.scans);
        println!("Opportunities found: {}", stats.opportunities_found);
        println!("Executed:            {}", stats.executed);
        println!("Stale:               {}", stats.stale);
        println!("User swaps:          {}", stats.user_swaps);
        println!("Total profit:        {} ETH", format_amount(stats.total_profit));
        Ok(())
    }
}

fn print_report(report: &ArbitrageReport) {
    let names: Vec<_> = report.pools.iter().map(|pool| pool.name.as_str()).collect();
    let spread = report
        .spread_bps
        .map(|bps| format!("{:.1} bps", bps))
        .unwrap_or_else(|| "-".to_string());

    match (&report.first_pool, &report.second_pool) {
        (Some(first), Some(second)) => println!(
            "{}: swap {} ETH to DAI in {}, then the DAI back to ETH in {}, profit {} ETH (spread {})",
            names.join(" / "),
            format_amount(report.amount_to_swap),
            first,
            second,
            format_amount(report.profit),
            spread,
        ),
        _ if report.kind == "unprofitable" => {
            println!("{}: fees too high for arbitrage (spread {})", names.join(" / "), spread)
        }
        _ => println!("{}: no arbitrage opportunity", names.join(" / ")),
    }
}
