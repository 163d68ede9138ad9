pub mod analytics;
pub mod applications;
pub mod cookies;
pub mod experience;
pub mod jobs;
pub mod jwt;
pub mod users;
