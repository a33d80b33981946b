fn main() {
    if let Err(err) = agentchat::cli::main() {
        eprintln!("❌ Error: {err}");
        std::process::exit(1);
    }
}
