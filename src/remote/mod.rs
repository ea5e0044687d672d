pub mod github;
pub mod raw;

pub use github::GithubContents;
pub use raw::RawRepository;
