pub mod daily_metric;
pub mod insight;
pub mod user;
