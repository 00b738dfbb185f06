pub mod candidate;
pub mod identity;

pub use candidate::Candidate;
pub use identity::Identity;
