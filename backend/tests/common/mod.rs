
pub use helpers::{
    apply, application_form, create_job, create_job_with, deadline_in_days, error_message,
    generate_test_email, login, pdf_part, register, register_and_login, submit_form, TestUser,
    SAMPLE_PDF, TEST_PASSWORD,
};
pub use database::TestDb;
pub use test_app::{TestApp, TestAppOptions};
