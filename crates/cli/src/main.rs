fn main() {
    if let Err(e) = cdda_lsp_cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
