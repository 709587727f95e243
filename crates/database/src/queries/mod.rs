//! Read queries against the source database

pub mod books;

pub use books::load_books;
