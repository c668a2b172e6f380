// Egg data model - panel-side application templates and their variables

mod types;

pub use types::{Egg, EggVariable, Location, Nest, Node, PanelUser, Server};
