pub mod classifier;
pub mod file_scanner;
pub mod paths;

pub use classifier::{RepositoryClassifier, classify_paths};
pub use file_scanner::FileScanner;
