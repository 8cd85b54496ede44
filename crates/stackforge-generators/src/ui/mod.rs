//! User-interface generators.

mod react;

pub use react::ReactGenerator;
