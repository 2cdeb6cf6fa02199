pub mod called_element;
pub mod health;
