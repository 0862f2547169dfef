//! Categories for grouping expenses, e.g. 'Rent' or 'Groceries'.

mod db;
mod domain;
mod endpoints;

pub use db::{
    create_category, create_category_table, delete_category, get_category, list_categories,
    update_category,
};
pub use domain::{Category, CategoryId, CategoryName, NewCategory};
pub use endpoints::{
    create_category_endpoint, delete_category_endpoint, get_category_endpoint,
    list_categories_endpoint, update_category_endpoint,
};
