mod commit;
mod repo;
mod walk;

pub use commit::*;
pub use repo::*;
pub use walk::*;
