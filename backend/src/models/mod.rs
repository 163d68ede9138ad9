pub mod analytics;
pub mod applications;
pub mod jobs;
pub mod pagination;
pub mod users;
