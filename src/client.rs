use std::sync::{Arc, LazyLock};

use crate::auth::{AccountType, AuthClient, SessionGuard, TokenStore};
use crate::config::ClientConfig;
use crate::error::ClientResult;
use crate::gateway::{ApiGateway, Transport};
use crate::logger::Logger;
use crate::messaging::MessagingService;
use crate::platform::clock::{Clock, SystemClock};
use crate::profile::ProfileService;
use crate::reminders::{InMemoryNotifier, LocalNotifier, ReminderScheduler};
use crate::storage::{InMemoryStorage, SharedStorage};

static LOGGER: LazyLock<Logger> = LazyLock::new(|| Logger::new("@carelink/client"));

/// First screen to show after startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryRoute {
    Login,
    Dashboard,
    FamilyDashboard,
}

/// Every service of the crate wired to one session.
#[derive(Debug)]
pub struct CareClient {
    config: Arc<ClientConfig>,
    auth: Arc<AuthClient>,
    session: Arc<SessionGuard>,
    gateway: Arc<ApiGateway>,
    profiles: ProfileService,
    reminders: ReminderScheduler,
    messaging: MessagingService,
}

impl CareClient {
    pub fn builder(config: ClientConfig) -> CareClientBuilder {
        CareClientBuilder::new(config)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn auth(&self) -> &Arc<AuthClient> {
        &self.auth
    }

    pub fn session(&self) -> &Arc<SessionGuard> {
        &self.session
    }

    pub fn gateway(&self) -> &Arc<ApiGateway> {
        &self.gateway
    }

    pub fn profiles(&self) -> &ProfileService {
        &self.profiles
    }

    pub fn reminders(&self) -> &ReminderScheduler {
        &self.reminders
    }

    pub fn messaging(&self) -> &MessagingService {
        &self.messaging
    }

    /// Picks the startup screen: the login screen without a usable session,
    /// otherwise the dashboard matching the cached account type.
    pub async fn entry_route(&self) -> EntryRoute {
        if !self.session.is_logged_in().await {
            return EntryRoute::Login;
        }
        match self.auth.account_type().await {
            Ok(Some(AccountType::Family)) => EntryRoute::FamilyDashboard,
            Ok(_) => EntryRoute::Dashboard,
            Err(err) => {
                LOGGER.warn(format!("Cannot read cached account type: {err}"));
                EntryRoute::Login
            }
        }
    }

    /// Ends the session and drops the cached profile.
    pub async fn sign_out(&self) -> ClientResult<()> {
        let (session, profile) = futures::join!(self.auth.logout(), self.profiles.clear_cache());
        session?;
        profile
    }
}

/// Builder for [`CareClient`].
///
/// Without overrides the credential bundle lives in memory only, reminders
/// go to an [`InMemoryNotifier`] and time comes from the device clock.
pub struct CareClientBuilder {
    config: ClientConfig,
    secure_storage: Option<SharedStorage>,
    general_storage: Option<SharedStorage>,
    notifier: Option<Arc<dyn LocalNotifier>>,
    clock: Option<Arc<dyn Clock>>,
}

impl CareClientBuilder {
    fn new(config: ClientConfig) -> Self {
        Self {
            config,
            secure_storage: None,
            general_storage: None,
            notifier: None,
            clock: None,
        }
    }

    /// Storage for the credential bundle. Must be encrypted at rest.
    pub fn with_secure_storage(mut self, storage: SharedStorage) -> Self {
        self.secure_storage = Some(storage);
        self
    }

    /// Storage for the profile, account type and chat caches.
    pub fn with_general_storage(mut self, storage: SharedStorage) -> Self {
        self.general_storage = Some(storage);
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn LocalNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn build(self) -> ClientResult<CareClient> {
        let config = Arc::new(self.config);
        let secure = self.secure_storage.unwrap_or_else(|| {
            LOGGER.warn("No secure storage configured; the session will not survive a restart");
            InMemoryStorage::shared()
        });
        let general = self
            .general_storage
            .unwrap_or_else(InMemoryStorage::shared);
        let notifier = self
            .notifier
            .unwrap_or_else(|| Arc::new(InMemoryNotifier::new()));
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));

        let transport = Arc::new(Transport::new(config.clone())?);
        let auth = Arc::new(AuthClient::new(
            transport.clone(),
            TokenStore::new(secure),
            general.clone(),
            clock.clone(),
        ));
        let session = Arc::new(SessionGuard::new(auth.clone(), clock.clone()));
        let gateway = Arc::new(ApiGateway::new(transport, session.clone()));

        Ok(CareClient {
            profiles: ProfileService::new(gateway.clone(), general.clone()),
            reminders: ReminderScheduler::new(gateway.clone(), notifier, clock.clone()),
            messaging: MessagingService::new(gateway.clone(), general, clock),
            config,
            auth,
            session,
            gateway,
        })
    }
}
