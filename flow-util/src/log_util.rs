use super::dirs::get_service_dir;
use flexi_logger::{Cleanup, Criterion, Duplicate, FileSpec, Logger, Naming, detailed_format};

pub struct LogConfig {
    pub service_name: String,
    pub file_name: Option<String>,
    pub file: bool,
    pub console: bool,
}

impl LogConfig {
    pub fn new(service_name: &str) -> Self {
        Self {
            service_name: service_name.to_string(),
            file_name: None,
            file: true,
            console: false,
        }
    }

    pub fn with_file_name(mut self, file_name: &str) -> Self {
        self.file_name = Some(file_name.to_string());
        self
    }

    pub fn enable_file(mut self, enable: bool) -> Self {
        self.file = enable;
        self
    }

    pub fn enable_console(mut self, enable: bool) -> Self {
        self.console = enable;
        self
    }
}

pub fn init_log(config: LogConfig) {
    let logger = Logger::try_with_env_or_str("info")
        .expect("Invalid default log spec")
        .format(detailed_format);

    let logger = if config.file {
        let log_dir = get_service_dir(&config.service_name).join("logs");
        std::fs::create_dir_all(&log_dir).expect("Failed to create log directory");

        let file_name = config.file_name.unwrap_or(config.service_name);
        logger
            .log_to_file(FileSpec::default().directory(log_dir).basename(file_name))
            .rotate(
                Criterion::Size(100_000_000), // Rotate at 100 MB
                Naming::Timestamps,
                Cleanup::KeepLogFiles(20),
            )
    } else {
        logger.log_to_stderr()
    };

    // Duplicating only makes sense when the primary sink is a file
    let logger = if config.console && config.file {
        logger.duplicate_to_stderr(Duplicate::All)
    } else {
        logger
    };

    logger.start().expect("Failed to initialize flexi_logger");
}
