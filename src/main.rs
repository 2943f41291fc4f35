//! Novelgen - AI 小说章节生成服务
//!
//! - Domain: 大纲解析 / 提示词构造
//! - Application: commands, queries, ports
//! - Infrastructure: http, persistence, adapters

use std::sync::Arc;

use novelgen::application::LlmEnginePort;
use novelgen::config::{load_config, print_config};
use novelgen::infrastructure::adapters::llm::{
    FakeLlmClient, FakeLlmClientConfig, HttpLlmClient, HttpLlmClientConfig,
};
use novelgen::infrastructure::http::{AppState, HttpServer, ServerConfig};
use novelgen::infrastructure::persistence::sqlite::{
    create_pool, run_migrations, DatabaseConfig, SqliteAccountRepository, SqliteChapterRepository,
    SqliteNovelRepository,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    // 初始化日志
    let log_filter = format!(
        "{},novelgen={},tower_http=debug",
        config.log.level, config.log.level
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter)),
        )
        .init();

    tracing::info!("Novelgen - AI 小说章节生成服务");
    print_config(&config);

    // 确保数据目录存在
    if let Some(parent) = std::path::Path::new(&config.database.path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    // 初始化数据库
    let db_config = DatabaseConfig {
        database_url: config.database.database_url(),
        max_connections: config.database.max_connections,
    };
    let pool = create_pool(&db_config).await?;
    run_migrations(&pool).await?;

    // 创建 Repository 适配器
    let novel_repo = Arc::new(SqliteNovelRepository::new(pool.clone()));
    let chapter_repo = Arc::new(SqliteChapterRepository::new(pool.clone()));
    let account_repo = Arc::new(SqliteAccountRepository::new(pool.clone()));

    // 创建 LLM 引擎
    let llm_engine: Arc<dyn LlmEnginePort> = match config.llm.provider.as_str() {
        "fake" => {
            tracing::warn!("Using fake LLM engine, generated content is canned");
            Arc::new(FakeLlmClient::new(FakeLlmClientConfig::default()))
        }
        _ => {
            let llm_config = HttpLlmClientConfig {
                base_url: config.llm.base_url.clone(),
                api_key: config.llm.api_key.clone(),
                model: config.llm.model.clone(),
                timeout_secs: config.llm.timeout_secs,
                temperature: config.llm.temperature,
                max_output_tokens: config.llm.max_output_tokens,
            };
            Arc::new(HttpLlmClient::new(llm_config).map_err(|e| anyhow::anyhow!("{}", e))?)
        }
    };

    // 创建 HTTP 服务器
    let server_config = ServerConfig::new(&config.server.host, config.server.port);
    let state = AppState::new(novel_repo, chapter_repo, account_repo, llm_engine);

    let server = HttpServer::new(server_config, state);

    tracing::info!("Starting HTTP server...");

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            tokio::signal::ctrl_c()
                .await
                .expect("Failed to listen for ctrl-c");
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
