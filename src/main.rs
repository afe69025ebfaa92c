//! Camera gateway binary
//!
//! Binds the TCP video listener and the two UDP channels, then runs the
//! event loop until interrupted. The synthetic camera source stands in for
//! capture hardware, so the gateway is runnable anywhere.
//!
//! Run with: cam-gateway [OPTIONS]

use std::net::IpAddr;
use std::str::FromStr;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use cam_gateway::{Gateway, GatewayConfig, SyntheticCamera};

fn print_usage() {
    eprintln!("Usage: cam-gateway [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --host <ADDR>          IP address to listen on (default: 0.0.0.0)");
    eprintln!("  --camport <PORT>       TCP port to stream video on (default: 13367)");
    eprintln!("  --cmdport <PORT>       UDP port to receive commands on (default: 13368)");
    eprintln!("  --statsport <PORT>     UDP port to serve stats on (default: 13369)");
    eprintln!("  --vidwidth <PIXELS>    Width of the video (default: 1200)");
    eprintln!("  --vidheight <PIXELS>   Height of the video (default: 800)");
    eprintln!("  --vidframerate <FPS>   Video framerate (default: 24)");
    eprintln!("  --statsperiod <MS>     Period between stats broadcasts (default: 200)");
    eprintln!("  --logall               Log everything, down to trace level");
    eprintln!("  -h, --help             Print this help");
}

fn parse_value<T: FromStr>(flag: &str, value: &str) -> Result<T, String> {
    value
        .parse()
        .map_err(|_| format!("Invalid value for {}: '{}'", flag, value))
}

fn parse_args(args: &[String]) -> Result<GatewayConfig, String> {
    let mut config = GatewayConfig::default();

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();

        if flag == "--logall" {
            config.log_all = true;
            i += 1;
            continue;
        }

        let value = args
            .get(i + 1)
            .ok_or_else(|| format!("Missing value for {}", flag))?;

        match flag {
            "--host" => {
                let normalized = value.replace("localhost", "127.0.0.1");
                config.host = IpAddr::from_str(&normalized)
                    .map_err(|_| format!("Invalid value for --host: '{}'", value))?;
            }
            "--camport" => config.camera_port = parse_value(flag, value)?,
            "--cmdport" => config.command_port = parse_value(flag, value)?,
            "--statsport" => config.stats_port = parse_value(flag, value)?,
            "--vidwidth" => config.video_width = parse_value(flag, value)?,
            "--vidheight" => config.video_height = parse_value(flag, value)?,
            "--vidframerate" => config.video_framerate = parse_value(flag, value)?,
            "--statsperiod" => {
                config.stats_period = Duration::from_millis(parse_value(flag, value)?)
            }
            _ => return Err(format!("Unknown argument: '{}'", flag)),
        }

        i += 2;
    }

    Ok(config)
}

fn log_args(config: &GatewayConfig) {
    tracing::info!(
        host = %config.host,
        camport = config.camera_port,
        cmdport = config.command_port,
        statsport = config.stats_port,
        vidwidth = config.video_width,
        vidheight = config.video_height,
        vidframerate = config.video_framerate,
        statsperiod_ms = config.stats_period.as_millis() as u64,
        "Using arguments"
    );
}

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return;
    }

    let config = match parse_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    };

    let default_level = if config.log_all { "trace" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("cam_gateway={}", default_level))),
        )
        .init();

    log_args(&config);

    let camera = SyntheticCamera::new(
        config.video_width,
        config.video_height,
        config.video_framerate,
    );

    let mut gateway = match Gateway::bind(&config, camera).await {
        Ok(gateway) => gateway,
        Err(e) => {
            tracing::error!(error = %e, "Failed to start gateway");
            std::process::exit(1);
        }
    };

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for interrupt");
            std::future::pending::<()>().await;
        }
    };

    if let Err(e) = gateway.run_until(shutdown).await {
        tracing::error!(error = %e, source = ?std::error::Error::source(&e), "Gateway terminated");
        std::process::exit(1);
    }

    tracing::info!("Exiting");
}
