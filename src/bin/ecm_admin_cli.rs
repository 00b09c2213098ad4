use ecm_admin::cli::run_cli;

fn main() {
    ecm_admin::init();
    if let Err(err) = run_cli() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
