pub mod mutation;
pub mod store;
pub mod view;

pub use mutation::MutationService;
pub use store::{ListSnapshot, ListState, QueryStore, Subscription};
pub use view::ListView;
