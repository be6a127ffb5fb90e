fn main() {
    if let Err(err) = bin_atlas::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
