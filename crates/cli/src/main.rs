fn main() {
    if let Err(e) = sxres_cli::run() {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
