pub mod catalog;

pub use catalog::{catalog, find, group, search, Category, CategoryGroup};
