//! Stallion command-line entry point.

use stallion::engine::ErrorCode;
use stallion::ui::output;

fn main() {
    let code = match stallion::cli::run() {
        Ok(result) => {
            if let Some(message) = result.message().filter(|m| !m.is_empty()) {
                output::error(message);
            }
            result.exit_code()
        }
        Err(e) => {
            output::error(format!("{:#}", e));
            ErrorCode::Exception.exit_code()
        }
    };
    std::process::exit(code);
}
