pub mod action_form;
pub mod catalog;
pub mod common;
pub mod component;

pub use action_form::ActionFormComponent;
pub use catalog::CatalogComponent;

