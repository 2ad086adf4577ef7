pub mod extract;
pub mod genre;
pub mod importer;
pub mod scanner;
