// Library root
// -----------
// The binary (`main.rs`) only parses the command line and hands it to
// `commands::run`; everything else lives here so it can be tested.
//
// Module responsibilities:
// - `cli`: command-line definition (clap).
// - `validate`: checks files and album options, builds the upload plan.
// - `settings` / `credentials`: configuration and the stored account.
// - `api`: blocking HTTP client for the image host.
// - `auth`: PIN login and token refresh.
// - `upload`: sequential upload orchestration.
// - `ui`: prompts, progress bar and result printing.
pub mod api;
pub mod auth;
pub mod cli;
pub mod commands;
pub mod credentials;
pub mod error;
pub mod logging;
pub mod settings;
pub mod ui;
pub mod upload;
pub mod validate;
