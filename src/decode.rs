pub(crate) mod command;
pub(crate) mod descriptor;
pub(crate) mod element_type;
pub(crate) mod input;
