//! Page controllers: form state, client-side validation and the calls each
//! page makes through the gateway.

pub mod account;
pub mod admin;
pub mod cover_letter;
pub mod dashboard;
pub mod normalize;
pub mod portfolio;
pub mod resume;
pub mod rows;
pub mod score;
pub mod skills;

pub use account::{LoginForm, PasswordForm, ProfileForm, RegisterForm};
pub use admin::AdminPanel;
pub use cover_letter::CoverLetterForm;
pub use dashboard::Dashboard;
pub use portfolio::PortfolioForm;
pub use resume::ResumeBuilder;
pub use score::ScoreForm;
pub use skills::SkillQueryForm;
