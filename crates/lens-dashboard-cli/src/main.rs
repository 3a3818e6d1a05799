#![forbid(unsafe_code)]

fn main() {
    std::process::exit(lens_dashboard_cli::run());
}
