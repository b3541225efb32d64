//! 会话构建器：由配置统一创建 LLM、静态课程表、Resolver、进度记录器与控制器
//!
//! 路由参数（流程与语言）只在会话开始时传入一次，之后不可更改。

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::config::AppConfig;
use crate::core::controller::{spawn_lesson, Command, LessonOutcome};
use crate::core::LessonView;
use crate::lesson::{
    BuiltinCatalog, ContentFallbackResolver, FallbackLanguages, FlowVariant, LessonSession,
    StepCatalog,
};
use crate::llm::{
    create_deepseek_client, create_gemini_client, LlmClient, MockLlmClient, OpenAiClient,
    OPENAI_DEFAULT_MODEL,
};
use crate::progress::{ProgressPersistence, ProgressTracker};

/// 根据配置与环境变量选择 LLM 后端（Gemini / OpenAI 兼容 / DeepSeek / Mock）
pub fn create_llm_from_config(cfg: &AppConfig) -> Arc<dyn LlmClient> {
    let provider = cfg.llm.provider.to_lowercase();
    let has_key = |name: &str| std::env::var(name).map(|v| !v.is_empty()).unwrap_or(false);

    let key_name = match provider.as_str() {
        "gemini" => Some("GEMINI_API_KEY"),
        "openai" => Some("OPENAI_API_KEY"),
        "deepseek" => Some("DEEPSEEK_API_KEY"),
        _ => None,
    };
    if provider == "mock" {
        tracing::info!("Using Mock LLM");
        return Arc::new(MockLlmClient);
    }

    match (key_name, provider_client(&provider, cfg)) {
        (Some(key), Some(client)) if has_key(key) => {
            tracing::info!(provider = %provider, model = client.model(), "Using remote LLM");
            Arc::new(client)
        }
        _ => {
            tracing::warn!(provider = %provider, "No API key set or provider unknown, using Mock LLM");
            Arc::new(MockLlmClient)
        }
    }
}

/// 按后端名创建 OpenAI 兼容客户端；`[llm] model` 未设置时各后端用自己的默认模型
fn provider_client(provider: &str, cfg: &AppConfig) -> Option<OpenAiClient> {
    let model = cfg.llm.model.as_deref();
    let client = match provider {
        "gemini" => create_gemini_client(model),
        "openai" => OpenAiClient::new(
            cfg.llm.base_url.as_deref(),
            model.unwrap_or(OPENAI_DEFAULT_MODEL),
            None,
        ),
        "deepseek" => create_deepseek_client(model),
        _ => return None,
    };
    Some(client.with_timeout(Duration::from_secs(cfg.llm.timeouts.request)))
}

/// 会话构建器
pub struct SessionBuilder {
    config: AppConfig,
    catalog: Arc<dyn StepCatalog>,
    llm: Option<Arc<dyn LlmClient>>,
    system_prompt: Option<String>,
    track_progress: bool,
}

impl SessionBuilder {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            catalog: Arc::new(BuiltinCatalog),
            llm: None,
            system_prompt: None,
            track_progress: true,
        }
    }

    /// 替换 LLM（测试或自定义后端）
    pub fn with_llm(mut self, llm: Arc<dyn LlmClient>) -> Self {
        self.llm = Some(llm);
        self
    }

    pub fn with_catalog(mut self, catalog: Arc<dyn StepCatalog>) -> Self {
        self.catalog = catalog;
        self
    }

    /// 从 config/prompts/lesson.md 加载生成课程的系统提示词（不存在则用内置）
    pub fn with_system_prompt_from_file(mut self) -> Self {
        self.system_prompt = ["config/prompts/lesson.md", "../config/prompts/lesson.md"]
            .into_iter()
            .find_map(|p| std::fs::read_to_string(p).ok());
        self
    }

    /// 是否记录学习进度（写入 <data_dir>/progress.json）
    pub fn with_progress(mut self, enable: bool) -> Self {
        self.track_progress = enable;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Scratch 流程；未指定语言时用配置中的默认语言
    pub fn scratch(&self, language: Option<&str>) -> FlowVariant {
        FlowVariant::scratch(language.unwrap_or(&self.config.lesson.scratch_language))
    }

    /// Comparison 流程；未指定的一侧用配置中的默认语言
    pub fn comparison(&self, left: Option<&str>, right: Option<&str>) -> FlowVariant {
        FlowVariant::comparison(
            left.unwrap_or(&self.config.lesson.comparison_left),
            right.unwrap_or(&self.config.lesson.comparison_right),
        )
    }

    pub fn build_llm(&self) -> Arc<dyn LlmClient> {
        self.llm
            .clone()
            .unwrap_or_else(|| create_llm_from_config(&self.config))
    }

    pub fn build_resolver(&self) -> ContentFallbackResolver {
        let resolver = ContentFallbackResolver::new(self.build_llm());
        match &self.system_prompt {
            Some(prompt) => resolver.with_system_prompt(prompt.clone()),
            None => resolver,
        }
    }

    pub fn build_session(&self, flow: FlowVariant) -> LessonSession {
        let authored = self.catalog.static_steps(&flow);
        let fallbacks = FallbackLanguages::from(&self.config.lesson.fallback);
        LessonSession::with_fallbacks(flow, authored, self.build_resolver(), fallbacks)
    }

    pub fn build_progress(&self) -> Option<ProgressTracker> {
        if !self.track_progress {
            return None;
        }
        let persistence = ProgressPersistence::in_dir(self.config.app.data_dir());
        Some(ProgressTracker::open(persistence))
    }

    /// 构建会话并启动控制器
    pub fn spawn(
        &self,
        flow: FlowVariant,
    ) -> (
        mpsc::UnboundedSender<Command>,
        watch::Receiver<LessonView>,
        JoinHandle<LessonOutcome>,
    ) {
        spawn_lesson(self.build_session(flow), self.build_progress())
    }
}
