// Page templates
pub mod panel_template;

pub use panel_template::PanelTemplate;
