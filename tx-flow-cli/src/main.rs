mod cmd;
mod flow_service;

#[macro_use]
extern crate log;

use clap::Parser;
use cmd::Cli;
use flow_service::FlowService;

#[tokio::main]
async fn main() {
    let log_config = flow_util::LogConfig::new(flow_util::TX_FLOW_CLI_TOOL_NAME)
        .enable_file(false)
        .enable_console(true);

    flow_util::init_log(log_config);

    let cli = Cli::parse();
    let service = match FlowService::new(cli.root.clone(), cli.network) {
        Ok(service) => service,
        Err(e) => {
            println!("Failed to initialize tx flow service: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = service.process_command(cli.command).await {
        println!("Error processing command: {}", e);
        std::process::exit(1);
    }
}
