//! Generation Command Handlers - 章节生成事务管理
//!
//! 一次生成是一个带补偿动作的事务:
//! debit -> 流式生成 -> commit，任一环节失败则 refund + 状态复位。
//!
//! 顺序保证:
//! - 扣费严格先于打开内容流
//! - 正文落盘严格晚于流完全耗尽（也是正文唯一落盘点）
//! - 回滚严格晚于失败发生、严格先于错误对外暴露

use futures_util::StreamExt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use uuid::Uuid;

use crate::application::commands::{GenerateOutline, StartChapterGeneration};
use crate::application::error::ApplicationError;
use crate::application::ports::{
    AccountRepositoryPort, ChapterRepositoryPort, ChapterStatus, ContentStream, LlmEnginePort,
    NovelRepositoryPort,
};
use crate::application::{GENERATION_COST, INITIAL_TOKEN_GRANT};
use crate::domain::{prompt, ChapterPrompt};

/// 片段转发通道容量
const FRAGMENT_CHANNEL_CAPACITY: usize = 32;

/// 章节片段流 - 调用方增量消费；错误项终止整个流
pub type ChapterFragmentStream = ReceiverStream<Result<String, ApplicationError>>;

/// StartChapterGeneration Handler
pub struct StartChapterGenerationHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
    chapter_repo: Arc<dyn ChapterRepositoryPort>,
    account_repo: Arc<dyn AccountRepositoryPort>,
    llm_engine: Arc<dyn LlmEnginePort>,
}

impl StartChapterGenerationHandler {
    pub fn new(
        novel_repo: Arc<dyn NovelRepositoryPort>,
        chapter_repo: Arc<dyn ChapterRepositoryPort>,
        account_repo: Arc<dyn AccountRepositoryPort>,
        llm_engine: Arc<dyn LlmEnginePort>,
    ) -> Self {
        Self {
            novel_repo,
            chapter_repo,
            account_repo,
            llm_engine,
        }
    }

    /// 启动一次章节生成
    ///
    /// 前置校验、认领与扣费同步完成后返回片段流，生成循环在独立任务上驱动。
    /// 同步返回的错误都发生在任何余额/状态副作用之前（余额不变），
    /// 流中出现的错误则保证回滚已经完成。
    pub async fn handle(
        &self,
        command: StartChapterGeneration,
    ) -> Result<ChapterFragmentStream, ApplicationError> {
        // ---- 前置校验（只读，无副作用） ----
        let chapter = self
            .chapter_repo
            .find_by_id(command.chapter_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Chapter", command.chapter_id))?;

        let novel = self
            .novel_repo
            .find_by_id(chapter.novel_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Novel", chapter.novel_id))?;

        // 归属校验: 非本人的章节按不存在处理
        if novel.user_id != command.user_id {
            return Err(ApplicationError::not_found("Chapter", command.chapter_id));
        }

        if chapter.status == ChapterStatus::Completed {
            return Err(ApplicationError::AlreadyCompleted(chapter.id));
        }

        let account = self
            .account_repo
            .ensure(command.user_id, INITIAL_TOKEN_GRANT)
            .await?;
        if account.token_balance < GENERATION_COST {
            return Err(ApplicationError::InsufficientBalance {
                required: GENERATION_COST,
                available: account.token_balance,
            });
        }

        let previous_content = self
            .chapter_repo
            .find_previous_completed_content(novel.id, chapter.chapter_number)
            .await?;

        // ---- 原子认领: pending -> generating ----
        // 并发请求中至多一个通过，落败方在扣费前即被拒绝
        if !self
            .chapter_repo
            .try_begin_generation(chapter.id, GENERATION_COST)
            .await?
        {
            return Err(ApplicationError::invalid_state(format!(
                "chapter {} is not pending",
                chapter.id
            )));
        }

        // ---- 条件扣费; 失败则释放认领 ----
        if !self
            .account_repo
            .try_debit(command.user_id, GENERATION_COST)
            .await?
        {
            self.chapter_repo.reset_generation(chapter.id).await?;
            // 扣费竞争失败意味着前置读取的余额已过期，重读后再上报
            let available = self
                .account_repo
                .find_by_id(command.user_id)
                .await?
                .map(|a| a.token_balance)
                .unwrap_or(0);
            return Err(ApplicationError::InsufficientBalance {
                required: GENERATION_COST,
                available,
            });
        }

        tracing::info!(
            chapter_id = %chapter.id,
            novel_id = %novel.id,
            chapter_number = chapter.chapter_number,
            cost = GENERATION_COST,
            "Chapter generation started"
        );

        // ---- 打开内容流（扣费之后） ----
        let chapter_prompt = ChapterPrompt {
            novel_type: novel.novel_type,
            theme: novel.theme,
            outline: novel.outline,
            chapter_number: chapter.chapter_number,
            title: chapter.title,
            summary: chapter.summary,
            previous_content,
        };

        let stream = match self.llm_engine.open_chapter_stream(&chapter_prompt).await {
            Ok(stream) => stream,
            Err(e) => {
                tracing::error!(chapter_id = %chapter.id, error = %e, "Failed to open content stream");
                rollback(
                    self.chapter_repo.as_ref(),
                    self.account_repo.as_ref(),
                    chapter.id,
                    command.user_id,
                )
                .await;
                return Err(e.into());
            }
        };

        let (tx, rx) = mpsc::channel(FRAGMENT_CHANNEL_CAPACITY);
        let ctx = GenerationContext {
            chapter_id: chapter.id,
            user_id: command.user_id,
            chapter_repo: self.chapter_repo.clone(),
            account_repo: self.account_repo.clone(),
        };
        tokio::spawn(drive_generation(ctx, stream, tx));

        Ok(ReceiverStream::new(rx))
    }
}

/// 生成循环需要的上下文
struct GenerationContext {
    chapter_id: Uuid,
    user_id: Uuid,
    chapter_repo: Arc<dyn ChapterRepositoryPort>,
    account_repo: Arc<dyn AccountRepositoryPort>,
}

/// 在独立任务上驱动内容流
///
/// 逐片段累积并转发给调用方；流耗尽后落盘正文；
/// 服务错误、落盘失败、调用方断开都走同一条回滚路径。
async fn drive_generation(
    ctx: GenerationContext,
    mut stream: ContentStream,
    tx: mpsc::Sender<Result<String, ApplicationError>>,
) {
    let mut accumulated = String::new();

    while let Some(item) = stream.next().await {
        match item {
            Ok(fragment) => {
                accumulated.push_str(&fragment);
                if tx.send(Ok(fragment)).await.is_err() {
                    // 调用方断开: 取消拉取（丢弃流），按失败回滚
                    tracing::warn!(
                        chapter_id = %ctx.chapter_id,
                        streamed_chars = accumulated.chars().count(),
                        "Caller disconnected mid-stream, rolling back"
                    );
                    rollback(
                        ctx.chapter_repo.as_ref(),
                        ctx.account_repo.as_ref(),
                        ctx.chapter_id,
                        ctx.user_id,
                    )
                    .await;
                    return;
                }
            }
            Err(e) => {
                tracing::error!(
                    chapter_id = %ctx.chapter_id,
                    error = %e,
                    "Provider stream failed, rolling back"
                );
                rollback(
                    ctx.chapter_repo.as_ref(),
                    ctx.account_repo.as_ref(),
                    ctx.chapter_id,
                    ctx.user_id,
                )
                .await;
                let _ = tx.send(Err(e.into())).await;
                return;
            }
        }
    }

    // 流正常耗尽: 唯一的正文落盘点
    let word_count = accumulated.chars().count() as i64;
    match ctx
        .chapter_repo
        .complete_generation(ctx.chapter_id, &accumulated, word_count)
        .await
    {
        Ok(true) => {
            tracing::info!(
                chapter_id = %ctx.chapter_id,
                word_count,
                "Chapter generation completed"
            );
        }
        Ok(false) => {
            tracing::error!(
                chapter_id = %ctx.chapter_id,
                "Chapter left generating state during generation, rolling back"
            );
            rollback(
                ctx.chapter_repo.as_ref(),
                ctx.account_repo.as_ref(),
                ctx.chapter_id,
                ctx.user_id,
            )
            .await;
            let _ = tx
                .send(Err(ApplicationError::invalid_state(format!(
                    "chapter {} is no longer generating",
                    ctx.chapter_id
                ))))
                .await;
        }
        Err(e) => {
            tracing::error!(
                chapter_id = %ctx.chapter_id,
                error = %e,
                "Persisting generated content failed, rolling back"
            );
            rollback(
                ctx.chapter_repo.as_ref(),
                ctx.account_repo.as_ref(),
                ctx.chapter_id,
                ctx.user_id,
            )
            .await;
            let _ = tx.send(Err(e.into())).await;
        }
    }
}

/// 补偿动作: 退款并把章节重置回 pending（费用清零，正文不落盘）
///
/// 回滚自身的失败只记录日志，不再向调用方传播
async fn rollback(
    chapter_repo: &dyn ChapterRepositoryPort,
    account_repo: &dyn AccountRepositoryPort,
    chapter_id: Uuid,
    user_id: Uuid,
) {
    if let Err(e) = account_repo.credit(user_id, GENERATION_COST).await {
        tracing::error!(chapter_id = %chapter_id, error = %e, "Refund failed during rollback");
    }
    if let Err(e) = chapter_repo.reset_generation(chapter_id).await {
        tracing::error!(chapter_id = %chapter_id, error = %e, "Status reset failed during rollback");
    }
}

// ============================================================================
// GenerateOutline
// ============================================================================

/// GenerateOutline Handler - 调用生成服务产出大纲文本（免费）
pub struct GenerateOutlineHandler {
    llm_engine: Arc<dyn LlmEnginePort>,
}

impl GenerateOutlineHandler {
    pub fn new(llm_engine: Arc<dyn LlmEnginePort>) -> Self {
        Self { llm_engine }
    }

    pub async fn handle(&self, command: GenerateOutline) -> Result<String, ApplicationError> {
        if command.novel_type.trim().is_empty() {
            return Err(ApplicationError::validation("novel_type is required"));
        }
        if command.theme.trim().is_empty() {
            return Err(ApplicationError::validation("theme is required"));
        }

        let raw = self
            .llm_engine
            .generate_outline(&command.novel_type, &command.theme)
            .await?;

        tracing::info!(
            user_id = %command.user_id,
            novel_type = %command.novel_type,
            chars = raw.chars().count(),
            "Outline generated"
        );

        Ok(prompt::sanitize_generated(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::commands::handlers::CreateNovelHandler;
    use crate::application::commands::CreateNovel;
    use crate::application::ports::{AccountRecord, ChapterRecord, RepositoryError};
    use crate::infrastructure::adapters::{FakeLlmClient, FakeLlmClientConfig};
    use crate::infrastructure::persistence::sqlite::{
        create_pool, run_migrations, DatabaseConfig, SqliteAccountRepository,
        SqliteChapterRepository, SqliteNovelRepository,
    };

    struct Fixture {
        handler: StartChapterGenerationHandler,
        chapter_repo: Arc<SqliteChapterRepository>,
        account_repo: Arc<SqliteAccountRepository>,
        user_id: Uuid,
        chapters: Vec<ChapterRecord>,
        prompts: Arc<std::sync::Mutex<Vec<String>>>,
    }

    async fn setup(llm: FakeLlmClient, initial_balance: i64) -> Fixture {
        let prompts = llm.captured_prompts();
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let novel_repo = Arc::new(SqliteNovelRepository::new(pool.clone()));
        let chapter_repo = Arc::new(SqliteChapterRepository::new(pool.clone()));
        let account_repo = Arc::new(SqliteAccountRepository::new(pool));

        let user_id = Uuid::new_v4();
        account_repo.ensure(user_id, initial_balance).await.unwrap();

        let created = CreateNovelHandler::new(novel_repo.clone())
            .handle(CreateNovel {
                user_id,
                title: "测试小说".to_string(),
                novel_type: "都市".to_string(),
                theme: "逆袭".to_string(),
                outline: "第1章 风起：主角登场。\n第2章 反击：主角出手。".to_string(),
            })
            .await
            .unwrap();

        let handler = StartChapterGenerationHandler::new(
            novel_repo,
            chapter_repo.clone(),
            account_repo.clone(),
            Arc::new(llm),
        );

        Fixture {
            handler,
            chapter_repo,
            account_repo,
            user_id,
            chapters: created.chapters,
            prompts,
        }
    }

    async fn collect(mut stream: ChapterFragmentStream) -> (String, Option<ApplicationError>) {
        let mut text = String::new();
        while let Some(item) = stream.next().await {
            match item {
                Ok(fragment) => text.push_str(&fragment),
                Err(e) => return (text, Some(e)),
            }
        }
        (text, None)
    }

    fn fragments(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_success_path_debits_and_persists() {
        let llm = FakeLlmClient::new(FakeLlmClientConfig {
            fragments: fragments(&["夜色", "渐深，", "他登场了。"]),
            ..Default::default()
        });
        let f = setup(llm, 10_000).await;
        let chapter_id = f.chapters[0].id;

        let stream = f
            .handler
            .handle(StartChapterGeneration {
                user_id: f.user_id,
                chapter_id,
            })
            .await
            .unwrap();

        let (text, err) = collect(stream).await;
        assert!(err.is_none());
        assert_eq!(text, "夜色渐深，他登场了。");

        let chapter = f.chapter_repo.find_by_id(chapter_id).await.unwrap().unwrap();
        assert_eq!(chapter.status, ChapterStatus::Completed);
        assert_eq!(chapter.content, "夜色渐深，他登场了。");
        assert_eq!(chapter.word_count, chapter.content.chars().count() as i64);
        assert_eq!(chapter.cost, GENERATION_COST);

        let account = f.account_repo.find_by_id(f.user_id).await.unwrap().unwrap();
        assert_eq!(account.token_balance, 10_000 - GENERATION_COST);
    }

    #[tokio::test]
    async fn test_provider_failure_rolls_back_completely() {
        let llm = FakeLlmClient::new(FakeLlmClientConfig {
            fragments: fragments(&["片段一", "片段二", "片段三"]),
            fail_after: Some(2),
            ..Default::default()
        });
        let f = setup(llm, 10_000).await;
        let chapter_id = f.chapters[0].id;

        let stream = f
            .handler
            .handle(StartChapterGeneration {
                user_id: f.user_id,
                chapter_id,
            })
            .await
            .unwrap();

        let (partial, err) = collect(stream).await;
        assert_eq!(partial, "片段一片段二");
        assert!(matches!(err, Some(ApplicationError::ProviderError(_))));

        // 错误对外暴露时回滚必须已经完成
        let chapter = f.chapter_repo.find_by_id(chapter_id).await.unwrap().unwrap();
        assert_eq!(chapter.status, ChapterStatus::Pending);
        assert_eq!(chapter.cost, 0);
        assert!(chapter.content.is_empty());
        assert_eq!(chapter.word_count, 0);

        let account = f.account_repo.find_by_id(f.user_id).await.unwrap().unwrap();
        assert_eq!(account.token_balance, 10_000);
    }

    #[tokio::test]
    async fn test_insufficient_balance_rejected_without_side_effects() {
        let llm = FakeLlmClient::new(FakeLlmClientConfig {
            fragments: fragments(&["未使用"]),
            ..Default::default()
        });
        let f = setup(llm, GENERATION_COST - 1).await;
        let chapter_id = f.chapters[0].id;

        let err = f
            .handler
            .handle(StartChapterGeneration {
                user_id: f.user_id,
                chapter_id,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ApplicationError::InsufficientBalance { .. }));

        let chapter = f.chapter_repo.find_by_id(chapter_id).await.unwrap().unwrap();
        assert_eq!(chapter.status, ChapterStatus::Pending);
        let account = f.account_repo.find_by_id(f.user_id).await.unwrap().unwrap();
        assert_eq!(account.token_balance, GENERATION_COST - 1);
    }

    /// ensure 上报的余额与真实存储脱节，模拟前置读取与扣费之间被并发扣费超车
    struct StaleBalanceAccountRepo {
        inner: Arc<SqliteAccountRepository>,
        reported_balance: i64,
    }

    #[async_trait::async_trait]
    impl AccountRepositoryPort for StaleBalanceAccountRepo {
        async fn find_by_id(&self, id: Uuid) -> Result<Option<AccountRecord>, RepositoryError> {
            self.inner.find_by_id(id).await
        }

        async fn ensure(
            &self,
            id: Uuid,
            initial_balance: i64,
        ) -> Result<AccountRecord, RepositoryError> {
            let mut account = self.inner.ensure(id, initial_balance).await?;
            account.token_balance = self.reported_balance;
            Ok(account)
        }

        async fn try_debit(&self, id: Uuid, amount: i64) -> Result<bool, RepositoryError> {
            self.inner.try_debit(id, amount).await
        }

        async fn credit(&self, id: Uuid, amount: i64) -> Result<(), RepositoryError> {
            self.inner.credit(id, amount).await
        }
    }

    #[tokio::test]
    async fn test_debit_race_reports_fresh_balance() {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let novel_repo = Arc::new(SqliteNovelRepository::new(pool.clone()));
        let chapter_repo = Arc::new(SqliteChapterRepository::new(pool.clone()));
        let sqlite_accounts = Arc::new(SqliteAccountRepository::new(pool));

        // 真实余额不足一次生成，但前置读取看到的是过期的充足余额
        let user_id = Uuid::new_v4();
        sqlite_accounts.ensure(user_id, 200).await.unwrap();

        let created = CreateNovelHandler::new(novel_repo.clone())
            .handle(CreateNovel {
                user_id,
                title: "测试小说".to_string(),
                novel_type: "都市".to_string(),
                theme: "逆袭".to_string(),
                outline: "第1章 开端：起点。".to_string(),
            })
            .await
            .unwrap();
        let chapter_id = created.chapters[0].id;

        let llm = FakeLlmClient::new(FakeLlmClientConfig {
            fragments: fragments(&["未使用"]),
            ..Default::default()
        });
        let handler = StartChapterGenerationHandler::new(
            novel_repo,
            chapter_repo.clone(),
            Arc::new(StaleBalanceAccountRepo {
                inner: sqlite_accounts.clone(),
                reported_balance: 10_000,
            }),
            Arc::new(llm),
        );

        let err = handler
            .handle(StartChapterGeneration {
                user_id,
                chapter_id,
            })
            .await
            .unwrap_err();

        // 上报的 available 必须是扣费失败后重读的真实余额
        match err {
            ApplicationError::InsufficientBalance {
                required,
                available,
            } => {
                assert_eq!(required, GENERATION_COST);
                assert_eq!(available, 200);
            }
            other => panic!("unexpected error: {:?}", other),
        }

        // 认领已释放，余额未变
        let chapter = chapter_repo.find_by_id(chapter_id).await.unwrap().unwrap();
        assert_eq!(chapter.status, ChapterStatus::Pending);
        assert_eq!(chapter.cost, 0);
        let account = sqlite_accounts.find_by_id(user_id).await.unwrap().unwrap();
        assert_eq!(account.token_balance, 200);
    }

    #[tokio::test]
    async fn test_already_completed_rejected() {
        let llm = FakeLlmClient::new(FakeLlmClientConfig {
            fragments: fragments(&["正文"]),
            ..Default::default()
        });
        let f = setup(llm, 10_000).await;
        let chapter_id = f.chapters[0].id;

        let stream = f
            .handler
            .handle(StartChapterGeneration {
                user_id: f.user_id,
                chapter_id,
            })
            .await
            .unwrap();
        let (_, err) = collect(stream).await;
        assert!(err.is_none());

        let err = f
            .handler
            .handle(StartChapterGeneration {
                user_id: f.user_id,
                chapter_id,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::AlreadyCompleted(_)));

        // 余额只被扣了一次
        let account = f.account_repo.find_by_id(f.user_id).await.unwrap().unwrap();
        assert_eq!(account.token_balance, 10_000 - GENERATION_COST);
    }

    #[tokio::test]
    async fn test_foreign_chapter_treated_as_not_found() {
        let llm = FakeLlmClient::new(FakeLlmClientConfig {
            fragments: fragments(&["正文"]),
            ..Default::default()
        });
        let f = setup(llm, 10_000).await;

        let err = f
            .handler
            .handle(StartChapterGeneration {
                user_id: Uuid::new_v4(),
                chapter_id: f.chapters[0].id,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ApplicationError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_concurrent_starts_charge_at_most_once() {
        let llm = FakeLlmClient::new(FakeLlmClientConfig {
            fragments: fragments(&["正文片段"]),
            fragment_delay_ms: 20,
            ..Default::default()
        });
        let f = setup(llm, 10_000).await;
        let chapter_id = f.chapters[0].id;

        let first = f.handler.handle(StartChapterGeneration {
            user_id: f.user_id,
            chapter_id,
        });
        let second = f.handler.handle(StartChapterGeneration {
            user_id: f.user_id,
            chapter_id,
        });

        let (r1, r2) = tokio::join!(first, second);
        let successes = [r1.is_ok(), r2.is_ok()].iter().filter(|ok| **ok).count();
        assert_eq!(successes, 1, "exactly one concurrent start may win the claim");

        // 赢家跑完
        for result in [r1, r2] {
            if let Ok(stream) = result {
                let (_, err) = collect(stream).await;
                assert!(err.is_none());
            }
        }

        let account = f.account_repo.find_by_id(f.user_id).await.unwrap().unwrap();
        assert_eq!(account.token_balance, 10_000 - GENERATION_COST);
    }

    #[tokio::test]
    async fn test_second_start_while_generating_rejected_before_debit() {
        // 流挂起（长延迟），第一次调用保持 generating 状态
        let llm = FakeLlmClient::new(FakeLlmClientConfig {
            fragments: fragments(&["a", "b", "c", "d"]),
            fragment_delay_ms: 200,
            ..Default::default()
        });
        let f = setup(llm, 10_000).await;
        let chapter_id = f.chapters[0].id;

        let _stream = f
            .handler
            .handle(StartChapterGeneration {
                user_id: f.user_id,
                chapter_id,
            })
            .await
            .unwrap();

        let err = f
            .handler
            .handle(StartChapterGeneration {
                user_id: f.user_id,
                chapter_id,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::InvalidState(_)));

        // 只有第一次的扣费生效
        let account = f.account_repo.find_by_id(f.user_id).await.unwrap().unwrap();
        assert_eq!(account.token_balance, 10_000 - GENERATION_COST);
    }

    #[tokio::test]
    async fn test_caller_disconnect_rolls_back() {
        let llm = FakeLlmClient::new(FakeLlmClientConfig {
            fragments: (0..100).map(|i| format!("片段{}", i)).collect(),
            fragment_delay_ms: 10,
            ..Default::default()
        });
        let f = setup(llm, 10_000).await;
        let chapter_id = f.chapters[0].id;

        let mut stream = f
            .handler
            .handle(StartChapterGeneration {
                user_id: f.user_id,
                chapter_id,
            })
            .await
            .unwrap();

        // 消费少量片段后断开
        let _ = stream.next().await;
        let _ = stream.next().await;
        drop(stream);

        // 等待后台任务检测到断开并完成回滚
        let mut rolled_back = false;
        for _ in 0..50 {
            tokio::time::sleep(tokio::time::Duration::from_millis(20)).await;
            let chapter = f.chapter_repo.find_by_id(chapter_id).await.unwrap().unwrap();
            let account = f.account_repo.find_by_id(f.user_id).await.unwrap().unwrap();
            if chapter.status == ChapterStatus::Pending && account.token_balance == 10_000 {
                rolled_back = true;
                assert!(chapter.content.is_empty());
                assert_eq!(chapter.cost, 0);
                break;
            }
        }
        assert!(rolled_back, "disconnect must trigger the rollback path");
    }

    #[tokio::test]
    async fn test_continuity_context_uses_bounded_tail() {
        let llm = FakeLlmClient::new(FakeLlmClientConfig {
            fragments: fragments(&["第二章正文。"]),
            ..Default::default()
        });
        let f = setup(llm, 10_000).await;

        // 第一章直接落为 completed，正文超过连续性上下文上限
        let ch1 = f.chapters[0].id;
        let long_content = "废".repeat(3000) + "结尾标记";
        assert!(f
            .chapter_repo
            .try_begin_generation(ch1, GENERATION_COST)
            .await
            .unwrap());
        assert!(f
            .chapter_repo
            .complete_generation(ch1, &long_content, long_content.chars().count() as i64)
            .await
            .unwrap());

        let stream = f
            .handler
            .handle(StartChapterGeneration {
                user_id: f.user_id,
                chapter_id: f.chapters[1].id,
            })
            .await
            .unwrap();
        let (_, err) = collect(stream).await;
        assert!(err.is_none());

        let prompts = f.prompts.lock().unwrap();
        let prompt = prompts.last().unwrap();
        assert!(prompt.contains("结尾内容回顾"));
        assert!(prompt.contains("结尾标记"));
        // 只有限长的尾部切片进入提示词
        let waste_run = "废".repeat(2001);
        assert!(!prompt.contains(&waste_run));
    }

    #[tokio::test]
    async fn test_no_continuity_section_without_previous_chapter() {
        let llm = FakeLlmClient::new(FakeLlmClientConfig {
            fragments: fragments(&["第一章正文。"]),
            ..Default::default()
        });
        let f = setup(llm, 10_000).await;

        let stream = f
            .handler
            .handle(StartChapterGeneration {
                user_id: f.user_id,
                chapter_id: f.chapters[0].id,
            })
            .await
            .unwrap();
        let (_, err) = collect(stream).await;
        assert!(err.is_none());

        let prompts = f.prompts.lock().unwrap();
        assert!(!prompts.last().unwrap().contains("结尾内容回顾"));
    }

    #[tokio::test]
    async fn test_status_read_idempotent_after_completion() {
        let llm = FakeLlmClient::new(FakeLlmClientConfig {
            fragments: fragments(&["最终正文。"]),
            ..Default::default()
        });
        let f = setup(llm, 10_000).await;
        let chapter_id = f.chapters[0].id;

        let stream = f
            .handler
            .handle(StartChapterGeneration {
                user_id: f.user_id,
                chapter_id,
            })
            .await
            .unwrap();
        let (_, err) = collect(stream).await;
        assert!(err.is_none());

        let first = f.chapter_repo.find_by_id(chapter_id).await.unwrap().unwrap();
        let second = f.chapter_repo.find_by_id(chapter_id).await.unwrap().unwrap();
        assert_eq!(first.content, second.content);
        assert_eq!(first.word_count, second.word_count);
        assert_eq!(first.cost, second.cost);
    }

    #[tokio::test]
    async fn test_generate_outline_sanitized() {
        let llm = FakeLlmClient::new(FakeLlmClientConfig {
            outline_text: "收到，以下内容：\n作品名：夜行记\n第1章 开端：起点。".to_string(),
            ..Default::default()
        });
        let handler = GenerateOutlineHandler::new(Arc::new(llm));

        let outline = handler
            .handle(GenerateOutline {
                user_id: Uuid::new_v4(),
                novel_type: "悬疑".to_string(),
                theme: "旧案".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(outline, "作品名：夜行记\n第1章 开端：起点。");
    }
}
