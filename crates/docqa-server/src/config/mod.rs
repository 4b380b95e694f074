pub mod settings;

pub use settings::{
    AnsweringConfig, ExtractorConfig, LoggingConfig, ServerConfig, SessionConfig, Settings,
    UploadConfig, WindowingConfig,
};
