pub mod helpers;
pub mod panel;
pub mod shell;
