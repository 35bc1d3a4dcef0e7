pub mod lenient;
pub mod product;
pub mod sale;
