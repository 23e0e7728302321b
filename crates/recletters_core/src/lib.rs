pub mod authz;
pub mod domain;
pub mod endpoint;
pub mod mutation;
pub mod ports;
pub mod route;
pub mod transitions;
pub mod views;

pub use authz::{has_any_role, has_role, AuthzError, RoleSet};
pub use domain::{CurrentUser, Listing, Profile, RecommendationRequest, RequestStatus, RequestType, UserRef, UserSummary};
pub use endpoint::{derive_endpoint_key, endpoint_key_for, Collection, EndpointKey, RoleCategory, Scope};
pub use mutation::{plan, Mutation, MutationPlan, PlanError};
pub use ports::{
    MutationReceipt, NavigationService, NotificationService, OperationalLog, PortError, PortResult,
    RemoteCollectionService, SessionService,
};
pub use route::{Destination, Route};
