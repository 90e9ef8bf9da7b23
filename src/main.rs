use clap::Parser;

mod app;
mod cli;
mod commands;
mod config;
mod core;
mod discussion;
mod display;
mod input;
mod providers;
mod store;
mod utils;

use crate::app::Application;
use crate::cli::Args;
use crate::commands::create_command_registry;
use crate::config::Config;
use crate::providers::ModelGateway;
use crate::providers::openai::OpenAIGateway;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            display::print_error(&e);
            std::process::exit(1);
        }
    };

    let api_key = match Config::api_key() {
        Ok(key) => key,
        Err(e) => {
            display::print_error(&e);
            std::process::exit(1);
        }
    };

    let base_url = args.base_url.clone().or_else(|| config.base_url.clone());
    let gateway: Box<dyn ModelGateway> = match base_url {
        Some(url) => Box::new(OpenAIGateway::with_endpoint(url, api_key)),
        None => Box::new(OpenAIGateway::new(api_key)),
    };

    let dispatcher = create_command_registry();
    let mut app = Application::new(args, config, gateway, dispatcher);

    if let Err(e) = app.run().await {
        display::print_error(&e);
        std::process::exit(1);
    }
}
