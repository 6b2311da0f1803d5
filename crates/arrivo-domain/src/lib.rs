pub mod arrival;
pub mod arrival_service;
pub mod dispatcher;
pub mod error;
pub mod notification;
pub mod push_provider;
pub mod repository;
pub mod validator;

pub use arrival::*;
pub use arrival_service::ArrivalService;
pub use dispatcher::NotificationDispatcher;
pub use error::{DomainError, DomainResult};
pub use notification::NotificationComposer;
pub use push_provider::{PushError, PushProvider};
pub use repository::ArrivalRepository;
pub use validator::validate_report;
