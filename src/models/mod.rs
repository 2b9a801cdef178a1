pub mod profile;
pub mod session;

pub use profile::{ChildProfile, NewChild, MAX_AGE, MIN_AGE};
pub use session::{Emotions, FocusSession};
