//! Repository layer: one zero-sized struct per table family, each taking a
//! `&PgPool` and returning `sqlx::Error`.

pub mod attachment_repo;
pub mod claim_repo;
pub mod cpm_form_repo;
pub mod fppa04_cpm_repo;
pub mod fppa04_repo;
pub mod user_repo;

pub use attachment_repo::AttachmentRepo;
pub use claim_repo::ClaimRepo;
pub use cpm_form_repo::CpmFormRepo;
pub use fppa04_cpm_repo::Fppa04CpmRepo;
pub use fppa04_repo::Fppa04Repo;
pub use user_repo::UserRepo;
