pub mod form;
pub mod logging;
pub mod report;

pub use form::{FieldDefault, FieldRules, FormConfig, FormRules};
pub use logging::{LogFormat, LoggingConfig};
pub use report::ValidationReport;
