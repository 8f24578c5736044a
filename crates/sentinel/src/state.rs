//! Application state and shared resources.

use anyhow::Result;
use std::sync::Arc;

use crate::captcha::{CaptchaService, CaptchaStore};
use crate::config::{AppConfig, StoreBackendKind};
use crate::delivery::{LogMailSender, LogSmsSender, MailSender, SmsSender};
use crate::store::{CacheBackend, EphemeralStore, MemoryBackend, RedisBackend};
use crate::verification::{LazyService, VerificationService};

/// Everything that shares the cache connection
pub struct Services {
    /// Raw backend, for readiness checks
    pub backend: Arc<dyn CacheBackend>,

    /// SMS/email verification codes
    pub verification: VerificationService,

    /// Image CAPTCHA challenges
    pub captcha: CaptchaService,
}

impl Services {
    /// Wire services over an existing backend
    pub fn build(
        config: &AppConfig,
        backend: Arc<dyn CacheBackend>,
        sms: Arc<dyn SmsSender>,
        mail: Arc<dyn MailSender>,
    ) -> Self {
        let mode = config.app.env;

        let code_store = EphemeralStore::new(backend.clone(), config.verify_code_prefix());
        let verification = VerificationService::new(code_store, config, sms, mail);

        let captcha_store = CaptchaStore::new(
            EphemeralStore::new(backend.clone(), config.captcha_prefix()),
            &config.captcha,
            mode,
        );
        let captcha = CaptchaService::new(captcha_store, &config.captcha, mode);

        Self {
            backend,
            verification,
            captcha,
        }
    }

    /// Open the configured cache backend and wire services with the log
    /// delivery drivers
    pub async fn connect(config: &AppConfig) -> Result<Self> {
        let backend: Arc<dyn CacheBackend> = match config.store.backend {
            StoreBackendKind::Redis => {
                let redis = RedisBackend::connect(&config.redis_url).await?;
                tracing::info!(redis_url = %config.redis_url, "Redis connected");
                Arc::new(redis)
            }
            StoreBackendKind::Memory => {
                tracing::warn!("Using in-process store; codes are not shared between nodes");
                Arc::new(MemoryBackend::new())
            }
        };

        Ok(Self::build(
            config,
            backend,
            Arc::new(LogSmsSender),
            Arc::new(LogMailSender),
        ))
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,

    /// Services, built once on first use
    services: Arc<LazyService<Services>>,
}

impl AppState {
    /// State whose services connect on first access
    pub fn new(config: AppConfig) -> Self {
        let config = Arc::new(config);
        let init_config = config.clone();
        let services = LazyService::new(move || {
            let config = init_config.clone();
            async move { Services::connect(&config).await }
        });

        Self {
            config,
            services: Arc::new(services),
        }
    }

    /// State around services that are already wired
    pub fn with_services(config: AppConfig, services: Services) -> Self {
        Self {
            config: Arc::new(config),
            services: Arc::new(LazyService::ready(services)),
        }
    }

    /// The process-wide services. Concurrent first callers share a single
    /// connection attempt.
    pub async fn services(&self) -> Result<Arc<Services>> {
        self.services.get().await
    }
}
