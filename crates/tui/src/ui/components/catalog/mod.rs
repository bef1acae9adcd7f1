mod catalog_component;
pub mod state;

pub use catalog_component::CatalogComponent;
