fn main() {
    if let Err(err) = calldeck::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
