//! Common imports for quick starts.

// Common
pub use crate::{ApiError, BuildError, Error, Id, Role, User};

// Transport
pub use crate::{EduHttpClient, EduHttpClientBuilder, FileUpload};

// Façade and session
pub use crate::{Dispatcher, EduShare, SessionStore};

// Resource clients and their inputs
pub use crate::api::{
    auth::{Credentials, Registration},
    collections::{CollectionListOptions, NewCollection},
    profile::SearchOptions,
    resources::{NewResource, ResourceFilter},
    ListOptions, Listing,
};

// Forms and views
pub use crate::forms::{FormMachine, FormView, LoginForm, RegisterForm};
pub use crate::views::{MemoryNavigator, Navigator, Route, ViewController};
