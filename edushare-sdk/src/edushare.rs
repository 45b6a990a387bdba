//! High-level façade for the EduShare crate.
//!
//! ## Mental model
//! - `EduShare`: your handle on one running application, like one browser
//!   tab. Owns the HTTP client, the session store and the navigator.
//! - The resource clients (`auth()`, `profiles()`, ...) are cheap handles
//!   sharing that client and session.
//! - `dispatcher()` wraps authenticated calls with the 401 policy;
//!   `views()` guards navigation and follows other tabs.
//!
//! ```no_run
//! use edushare::{EduShare, api::collections::NewCollection};
//!
//! # async fn run(app: EduShare) -> edushare::Result<()> {
//! let dispatcher = app.dispatcher();
//! let created = dispatcher
//!     .run(app.collections().create(&NewCollection::named("Révisions bac")))
//!     .await?;
//! println!("collection {} créée", created.id);
//! # Ok(()) }
//! ```

use std::sync::Arc;

use crate::{
    api::{
        auth::AuthClient, collections::CollectionsClient, comments::CommentsClient,
        profile::ProfileClient, resources::ResourcesClient,
    },
    client::{core::EduHttpClient, transport::Transport},
    config::ClientConfig,
    dispatch::Dispatcher,
    errors::Result,
    forms::{FormMachine, LoginForm, RegisterForm},
    session::core::SessionStore,
    views::{MemoryNavigator, Navigator, Route, ViewController},
};

/// High-level façade. Owns the transport and navigator and hands out the
/// clients and controllers built on them.
#[derive(Clone, Debug)]
pub struct EduShare {
    transport: Transport,
    navigator: Arc<dyn Navigator>,
}

impl EduShare {
    /// Client of the backend at `base_url`, with an in-memory session and a
    /// [`MemoryNavigator`] on the home page.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Ok(Self::with_parts(
            EduHttpClient::new(base_url)?,
            SessionStore::in_memory(),
            Arc::new(MemoryNavigator::starting_at(Route::Home)),
        ))
    }

    /// Client configured by `config`.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let session = config.session_store()?;
        tracing::debug!(base_url = %config.api.base_url, storage = ?config.session.storage, "client configured");
        Ok(Self::with_parts(
            config.http_client()?,
            session,
            Arc::new(MemoryNavigator::starting_at(Route::Home)),
        ))
    }

    /// Assembles already-built parts.
    pub fn with_parts(
        client: EduHttpClient,
        session: SessionStore,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            transport: Transport::new(client, session),
            navigator,
        }
    }

    /// Same client and session, shown through another navigator.
    pub fn with_navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = navigator;
        self
    }

    /// A second tab: same client and storage, its own session handle, shown
    /// through `navigator`.
    pub fn open_tab(&self, navigator: Arc<dyn Navigator>) -> Self {
        Self::with_parts(
            self.transport.client().clone(),
            self.transport.session().fork(),
            navigator,
        )
    }

    /// `/auth`.
    pub fn auth(&self) -> AuthClient {
        AuthClient::new(self.transport.clone())
    }

    /// `/profil`.
    pub fn profiles(&self) -> ProfileClient {
        ProfileClient::new(self.transport.clone())
    }

    /// `/collections`.
    pub fn collections(&self) -> CollectionsClient {
        CollectionsClient::new(self.transport.clone())
    }

    /// `/commentaires`.
    pub fn comments(&self) -> CommentsClient {
        CommentsClient::new(self.transport.clone())
    }

    /// `/ressources`.
    pub fn resources(&self) -> ResourcesClient {
        ResourcesClient::new(self.transport.clone())
    }

    /// Applies the 401 policy to calls made with this façade.
    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher::new(self.session().clone(), Arc::clone(&self.navigator))
    }

    /// Route guard and cross-tab follower.
    pub fn views(&self) -> ViewController {
        ViewController::new(self.session().clone(), Arc::clone(&self.navigator))
    }

    /// Empty sign-in form.
    pub fn login_form(&self) -> FormMachine<LoginForm> {
        FormMachine::new(LoginForm::default())
    }

    /// Empty sign-up form.
    pub fn register_form(&self) -> FormMachine<RegisterForm> {
        FormMachine::new(RegisterForm::default())
    }

    /// The session store.
    pub fn session(&self) -> &SessionStore {
        self.transport.session()
    }

    /// The navigator.
    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    /// Access the underlying HTTP client (advanced use).
    #[inline]
    pub fn client(&self) -> &EduHttpClient {
        self.transport.client()
    }

    /// Access the session-aware transport (advanced use).
    #[inline]
    pub fn transport(&self) -> &Transport {
        &self.transport
    }
}
