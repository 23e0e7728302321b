pub mod http;
pub mod navigation;
pub mod notify;

pub use http::HttpAdapter;
pub use navigation::HistoryNavigator;
pub use notify::{TracingLog, TracingNotifier};
