use dotenvy::dotenv;
use tracing::{error, info};
use uuid::Uuid;

fn init_logging() {
    // .env 需先加载，RUST_LOG / LOG_FORMAT 才能生效
    dotenv().ok();
    let format = std::env::var("LOG_FORMAT").unwrap_or_default();
    common::utils::logging::init_logging(&format);
    info!(service = "catalog", event = "logger_init", "tracing subscriber initialized");
}

fn main() -> std::process::ExitCode {
    init_logging();

    let service_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    // Panic 钩子：未捕获的 panic 也写入日志
    std::panic::set_hook(Box::new(move |info| {
        error!(
            service = "catalog",
            event = "panic",
            %service_id,
            pid,
            message = %info,
            "unhandled panic occurred"
        );
    }));

    let cfg = match configs::AppConfig::load_and_validate() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(service = "catalog", event = "config_invalid", error = %e, "failed to load configuration");
            return std::process::ExitCode::FAILURE;
        }
    };

    // 线程数来自 server.worker_threads（或 TOKIO_WORKER_THREADS）
    let worker_threads = cfg.server.worker_threads;
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = worker_threads {
        builder.worker_threads(w);
    }

    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "catalog", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return std::process::ExitCode::FAILURE;
        }
    };

    info!(
        service = "catalog",
        event = "start",
        %service_id,
        pid,
        version,
        threads = worker_threads.unwrap_or_default(),
        "catalog service starting"
    );

    // Ctrl+C 触发 axum 的优雅停机，等待进行中的请求完成
    rt.block_on(async move {
        let shutdown = async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!(service = "catalog", event = "shutdown_signal", %service_id, pid, "received Ctrl+C, shutting down");
                }
                Err(e) => {
                    error!(service = "catalog", event = "signal_unavailable", error = %e, "cannot listen for Ctrl+C");
                    std::future::pending::<()>().await;
                }
            }
        };

        match server::run(cfg, shutdown).await {
            Ok(()) => {
                info!(service = "catalog", event = "stop", %service_id, pid, "catalog service stopped");
                std::process::ExitCode::SUCCESS
            }
            Err(e) => {
                error!(service = "catalog", event = "run_failed", error = %e, "server::run returned error");
                std::process::ExitCode::FAILURE
            }
        }
    })
}
