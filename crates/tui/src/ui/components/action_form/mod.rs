mod action_form_component;
pub mod state;

pub use action_form_component::ActionFormComponent;
